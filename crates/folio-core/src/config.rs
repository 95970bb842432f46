//! Application settings and the explicit context passed from `main`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::session::Session;

/// Directory name used under the platform config and data directories.
pub const APP_DIR: &str = "folio";

/// Default backend base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://localhost:7092/api";

/// Default number of messages revealed per chunk.
pub const DEFAULT_PAGE_CHUNK: usize = 12;

/// Settings that persist across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the portfolio REST API.
    pub api_base_url: String,
    /// Messages revealed per chunk in the inbox.
    pub page_chunk: usize,
    /// HTTP request timeout.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_chunk: DEFAULT_PAGE_CHUNK,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Default settings file location.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("settings.json")
    }

    /// Loads settings from `path`, falling back to defaults if it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// holds invalid values.
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path).await? {
            return Ok(Self::default());
        }
        let contents = tokio::fs::read_to_string(path).await?;
        let settings: Self = serde_json::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Writes settings to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;
        info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Checks that the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(Error::Config(format!(
                "api_base_url must start with http:// or https://, got {:?}",
                self.api_base_url
            )));
        }
        if self.page_chunk == 0 {
            return Err(Error::Config("page_chunk must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default directory for locally persisted state (the favorites database).
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Everything a command needs, built once at the composition root.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Loaded settings.
    pub settings: Settings,
    /// Current admin session, if logged in.
    pub session: Option<Session>,
    /// Directory for local durable storage.
    pub data_dir: PathBuf,
}

impl AppContext {
    /// Creates a context with no session and the default data directory.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            session: None,
            data_dir: default_data_dir(),
        }
    }

    /// Sets the session.
    #[must_use]
    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    /// Overrides the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Returns the session or an error telling the user to log in.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if there is no session.
    pub fn require_session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| Error::Config("not logged in; run `folio login` first".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("nope.json"))
            .await
            .unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.page_chunk, 12);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            api_base_url: "http://127.0.0.1:8080/api".into(),
            page_chunk: 5,
            request_timeout_secs: 3,
        };
        settings.save_to(&path).await.unwrap();
        assert_eq!(Settings::load_from(&path).await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, r#"{"page_chunk": 20}"#).await.unwrap();
        let settings = Settings::load_from(&path).await.unwrap();
        assert_eq!(settings.page_chunk, 20);
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let result = tokio_test::block_on(Settings::load_from(&path));
        assert!(matches!(result, Err(Error::Serde(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.page_chunk = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.api_base_url = "localhost:7092".into();
        assert!(matches!(settings.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_require_session() {
        let ctx = AppContext::new(Settings::default());
        assert!(ctx.require_session().is_err());
        let ctx = ctx.with_session(Some(Session::new("abc")));
        assert_eq!(ctx.require_session().unwrap().session_id, "abc");
    }
}
