//! Admin session handling.
//!
//! A session is an opaque id handed out by the login endpoint and echoed
//! back in the `X-Session-Id` header. It is never validated client-side.

pub mod credentials;

use serde::{Deserialize, Serialize};

pub use credentials::{CredentialError, CredentialResult};

/// An authenticated admin session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session id.
    pub session_id: String,
    /// Backend user id, if reported.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Display name, if reported.
    #[serde(default)]
    pub username: Option<String>,
}

impl Session {
    /// Creates a session with only an id.
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: None,
            username: None,
        }
    }

    /// Name to greet the admin with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.user_id.as_deref())
            .unwrap_or("admin")
    }
}
