//! Secure session storage using system keyring.
//!
//! The admin session id is kept in the platform's native credential store:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use keyring::Entry;
use tracing::{debug, warn};

use super::Session;

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "folio";

/// Credential type identifier for admin sessions.
const SESSION_CREDENTIAL: &str = "session";

/// Error type for credential operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Failed to access keyring.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Stored session could not be decoded.
    #[error("Stored session is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Result type for credential operations.
pub type CredentialResult<T> = std::result::Result<T, CredentialError>;

/// Generates the keyring entry key for the session of one backend.
fn credential_key(api_base_url: &str) -> String {
    format!(
        "{SERVICE_NAME}_{SESSION_CREDENTIAL}_{}",
        api_base_url.trim_end_matches('/')
    )
}

/// Stores the session for a backend in the system keyring.
///
/// # Errors
///
/// Returns an error if serialization or the keyring operation fails.
pub fn store_session(api_base_url: &str, session: &Session) -> CredentialResult<()> {
    let json = serde_json::to_string(session)?;
    let entry = Entry::new(SERVICE_NAME, &credential_key(api_base_url))?;
    entry.set_password(&json)?;
    debug!("Stored session for {api_base_url}");
    Ok(())
}

/// Retrieves the session for a backend from the system keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails or the entry is corrupt.
pub fn load_session(api_base_url: &str) -> CredentialResult<Option<Session>> {
    let entry = Entry::new(SERVICE_NAME, &credential_key(api_base_url))?;
    match entry.get_password() {
        Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
        Err(keyring::Error::NoEntry) => {
            debug!("No session found for {api_base_url}");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Deletes the session for a backend from the keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails (except for missing entries).
pub fn delete_session(api_base_url: &str) -> CredentialResult<()> {
    let entry = Entry::new(SERVICE_NAME, &credential_key(api_base_url))?;
    match entry.delete_credential() {
        Ok(()) => {
            debug!("Deleted session for {api_base_url}");
            Ok(())
        }
        Err(keyring::Error::NoEntry) => {
            debug!("No session to delete for {api_base_url}");
            Ok(())
        }
        Err(e) => {
            warn!("Failed to delete session: {e}");
            Err(e.into())
        }
    }
}
