//! Durable local key-value storage.
//!
//! A small string-to-string store scoped to the local user profile, kept in
//! a SQLite table so every write replaces one row atomically.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::rc::Rc;

use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::Result;

/// File name of the local database inside the data directory.
pub const DATABASE_FILE: &str = "folio.db";

/// String values keyed by fixed names.
pub trait KeyValueStore {
    /// Reads a value. Missing keys yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>>;

    /// Writes a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<()>>;
}

/// SQLite-backed store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the store at `database_path`, creating the file and table if
    /// they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Opens [`DATABASE_FILE`] inside `dir`, creating the directory first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub async fn open_in(dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(DATABASE_FILE);
        Self::new(&path.to_string_lossy()).await
    }

    /// Creates an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO kv_store (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        debug!("Stored {} bytes under {key}", value.len());
        Ok(())
    }
}

/// In-memory store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<RefCell<usize>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls so far, across all clones.
    #[must_use]
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_store_round_trip() {
        let store = SqliteStore::in_memory().await.unwrap();

        assert_eq!(store.get("prefs").await.unwrap(), None);
        store.set("prefs", r#"{"a":true}"#).await.unwrap();
        assert_eq!(
            store.get("prefs").await.unwrap().as_deref(),
            Some(r#"{"a":true}"#)
        );

        store.set("prefs", "{}").await.unwrap();
        assert_eq!(store.get("prefs").await.unwrap().as_deref(), Some("{}"));
        assert_eq!(store.get("other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");

        let store = SqliteStore::open_in(&data_dir).await.unwrap();
        store.set("prefs", r#"{"7":true}"#).await.unwrap();
        drop(store);

        assert!(data_dir.join(DATABASE_FILE).exists());
        let reopened = SqliteStore::open_in(&data_dir).await.unwrap();
        assert_eq!(
            reopened.get("prefs").await.unwrap().as_deref(),
            Some(r#"{"7":true}"#)
        );
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_contents() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("k", "v").await.unwrap();
        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(other.write_count(), 1);
    }
}
