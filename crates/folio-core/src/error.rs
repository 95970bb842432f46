//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with `success: false`.
    #[error("API error: {0}")]
    Api(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential storage error.
    #[error("Credential error: {0}")]
    Credential(#[from] crate::session::CredentialError),
}

impl Error {
    /// Creates an API error from the backend's failure message.
    #[must_use]
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api(message.into())
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
