//! Locally starred messages.
//!
//! Favorites never reach the backend. They are kept as a JSON object
//! `{ "<id>": true }` under a fixed storage key. Changes mark the set dirty
//! and [`Favorites::save`] writes it back in one go. Ids of messages deleted
//! elsewhere may linger; that is accepted.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::Result;
use crate::message::MessageId;
use crate::storage::KeyValueStore;

/// Storage key holding the favorites mapping.
pub const FAVORITES_KEY: &str = "admin_messages_favorites_v1";

/// Set of starred message ids.
#[derive(Debug, Clone, Default)]
pub struct Favorites {
    ids: BTreeSet<MessageId>,
    /// Set by every change, cleared by a successful save.
    dirty: bool,
}

impl Favorites {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads favorites from `store`.
    ///
    /// Missing, unreadable or malformed data yields an empty set.
    pub async fn load<S: KeyValueStore>(store: &S) -> Self {
        let ids = match store.get(FAVORITES_KEY).await {
            Ok(Some(raw)) => parse_favorites(&raw),
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                warn!("Could not read favorites, starting empty: {e}");
                BTreeSet::new()
            }
        };
        Self { ids, dirty: false }
    }

    /// Writes the set to `store` if it changed since the last save.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. The set stays dirty so the next
    /// save retries.
    pub async fn save<S: KeyValueStore>(&mut self, store: &S) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        store.set(FAVORITES_KEY, &self.to_json()?).await?;
        self.dirty = false;
        debug!("Saved {} favorites", self.ids.len());
        Ok(())
    }

    /// Whether `id` is starred.
    #[must_use]
    pub fn contains(&self, id: &MessageId) -> bool {
        self.ids.contains(id)
    }

    /// Stars or unstars `id`. Returns the new state.
    pub fn toggle(&mut self, id: &MessageId) -> bool {
        let starred = if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        };
        self.dirty = true;
        starred
    }

    /// Stars or unstars every id in `ids`.
    pub fn set_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a MessageId>, starred: bool) {
        for id in ids {
            let changed = if starred {
                self.ids.insert(id.clone())
            } else {
                self.ids.remove(id)
            };
            self.dirty |= changed;
        }
    }

    /// Unstars `id`. Returns whether it was starred.
    pub fn remove(&mut self, id: &MessageId) -> bool {
        let removed = self.ids.remove(id);
        self.dirty |= removed;
        removed
    }

    /// Whether there are changes not yet saved.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of starred ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is starred.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterates starred ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &MessageId> {
        self.ids.iter()
    }

    fn to_json(&self) -> Result<String> {
        let mapping: BTreeMap<&str, bool> =
            self.ids.iter().map(|id| (id.as_str(), true)).collect();
        Ok(serde_json::to_string(&mapping)?)
    }
}

/// Keeps every key whose value is truthy: anything except `false`, `null`,
/// zero and the empty string.
fn parse_favorites(raw: &str) -> BTreeSet<MessageId> {
    match serde_json::from_str::<BTreeMap<String, serde_json::Value>>(raw) {
        Ok(map) => map
            .into_iter()
            .filter(|(_, v)| is_truthy(v))
            .map(|(k, _)| MessageId::new(k))
            .collect(),
        Err(e) => {
            warn!("Ignoring malformed favorites data: {e}");
            BTreeSet::new()
        }
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
