//! Remote message collection.
//!
//! The inbox talks to the backend only through [`MessageGateway`], so the
//! state machine can be driven by an in-memory fake in tests and by
//! [`HttpGateway`] in production.
//!
//! Every backend response is wrapped in the same envelope:
//!
//! ```json
//! { "success": true, "data": [...], "message": "optional text" }
//! ```

mod http;

use std::future::Future;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::message::{Message, MessageId};

pub use http::{HttpGateway, LoginRequest, SESSION_HEADER};

/// Operations the inbox needs from the backend.
pub trait MessageGateway {
    /// Fetches the full message collection.
    fn list_messages(&self) -> impl Future<Output = Result<Vec<Message>>>;

    /// Marks a message as seen. The backend toggles the flag.
    fn mark_seen(&self, id: &MessageId) -> impl Future<Output = Result<()>>;

    /// Deletes a message.
    fn delete_message(&self, id: &MessageId) -> impl Future<Output = Result<()>>;
}

/// Response envelope shared by every backend endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the backend accepted the request.
    #[serde(default)]
    pub success: bool,
    /// Payload, present on successful reads.
    #[serde(default)]
    pub data: Option<T>,
    /// Human-readable status text.
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Converts `success: false` into [`Error::Api`].
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend message if `success` is false.
    pub fn into_result(self) -> Result<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            Err(Error::api(
                self.message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ))
        }
    }

    /// Like [`into_result`](Self::into_result) but also requires a payload.
    ///
    /// # Errors
    ///
    /// Returns an error if `success` is false or `data` is missing.
    pub fn into_data(self) -> Result<T> {
        self.into_result()?
            .ok_or_else(|| Error::api("response is missing data"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let resp: ApiResponse<Vec<Message>> =
            serde_json::from_str(r#"{"success": true, "data": [{"id": 1}]}"#).unwrap();
        let data = resp.into_data().unwrap();
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_failure_envelope_carries_message() {
        let resp: ApiResponse<()> =
            serde_json::from_str(r#"{"success": false, "message": "Session expired"}"#).unwrap();
        match resp.into_result() {
            Err(Error::Api(msg)) => assert_eq!(msg, "Session expired"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_missing_data_is_an_error() {
        let resp: ApiResponse<Vec<Message>> = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(resp.into_data().is_err());
    }

    #[test]
    fn test_missing_success_means_failure() {
        let resp: ApiResponse<()> = serde_json::from_str("{}").unwrap();
        assert!(resp.into_result().is_err());
    }
}
