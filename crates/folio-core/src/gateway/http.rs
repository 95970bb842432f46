//! REST implementation of the message gateway.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ApiResponse, MessageGateway};
use crate::config::AppContext;
use crate::error::{Error, Result};
use crate::message::{Message, MessageId, NewMessage};
use crate::session::Session;

/// Header carrying the admin session id.
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Credentials sent to the login endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Admin user id.
    pub user_id: String,
    /// Plain-text password (sent over TLS).
    pub password: String,
    /// Address the client reports for itself.
    pub ip_address: String,
    /// Client identification string.
    pub user_agent: String,
}

impl LoginRequest {
    /// Creates a login request with default client metadata.
    #[must_use]
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
            ip_address: "localhost".to_string(),
            user_agent: user_agent(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    user_id: Option<serde_json::Value>,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogoutRequest<'a> {
    session_id: &'a str,
}

fn user_agent() -> String {
    format!("folio/{}", env!("CARGO_PKG_VERSION"))
}

/// HTTP client for the portfolio backend.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    /// API base URL without a trailing slash.
    base_url: String,
    /// Session id attached to every request.
    session_id: Option<String>,
    /// HTTP client.
    http_client: Client,
}

impl HttpGateway {
    /// Creates a gateway for the given base URL with no session.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_id: None,
            http_client: Client::new(),
        }
    }

    /// Builds a gateway from the application context.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_context(ctx: &AppContext) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(ctx.settings.request_timeout_secs))
            .user_agent(user_agent())
            .build()?;
        Ok(Self {
            base_url: ctx.settings.api_base_url.trim_end_matches('/').to_string(),
            session_id: ctx.session.as_ref().map(|s| s.session_id.clone()),
            http_client,
        })
    }

    /// Sets the session id sent with every request.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the URL for `segments` under the base URL. Each segment is
    /// percent-encoded on its own, so ids cannot change the path shape.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid API base URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| {
                Error::Config(format!("API base URL {} cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let builder = self
            .http_client
            .request(method, self.endpoint(segments)?)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        Ok(match &self.session_id {
            Some(session) => builder.header(SESSION_HEADER, session),
            None => builder,
        })
    }

    /// Sends a request and decodes the body, whatever the status code.
    ///
    /// The backend reports most failures as a JSON body with
    /// `success: false`, sometimes alongside a 4xx/5xx status.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("backend answered {status} ({} bytes)", body.len());

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => Err(Error::api(format!("HTTP {status}"))),
            Err(e) => Err(e.into()),
        }
    }

    /// Logs in and returns the new session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects the
    /// credentials.
    pub async fn login(&self, request: &LoginRequest) -> Result<Session> {
        let response: LoginResponse = self
            .send(self.request(Method::POST, &["User", "login"])?.json(request))
            .await?;

        if !response.success {
            return Err(Error::api(
                response.message.unwrap_or_else(|| "Login failed".to_string()),
            ));
        }

        let session_id = response
            .session_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::api("login response is missing sessionId"))?;

        Ok(Session {
            session_id,
            user_id: response.user_id.map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            }),
            username: response.username,
        })
    }

    /// Ends a session on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    pub async fn logout(&self, session_id: &str) -> Result<()> {
        let response: ApiResponse<serde_json::Value> = self
            .send(
                self.request(Method::POST, &["User", "logout"])?
                    .json(&LogoutRequest { session_id }),
            )
            .await?;
        response.into_result().map(|_| ())
    }

    /// Submits a message through the public contact endpoint.
    ///
    /// Returns the backend's confirmation text, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    pub async fn send_message(&self, message: &NewMessage) -> Result<Option<String>> {
        let response: ApiResponse<serde_json::Value> = self
            .send(self.request(Method::POST, &["Messages", "create"])?.json(message))
            .await?;
        let text = response.message.clone();
        response.into_result()?;
        Ok(text)
    }
}

impl MessageGateway for HttpGateway {
    async fn list_messages(&self) -> Result<Vec<Message>> {
        let response: ApiResponse<Vec<Message>> =
            self.send(self.request(Method::GET, &["Messages", "all"])?).await?;
        response.into_data()
    }

    async fn mark_seen(&self, id: &MessageId) -> Result<()> {
        let request = self.request(Method::PATCH, &["Messages", "mark-seen", id.as_str()])?;
        let response: ApiResponse<serde_json::Value> = self.send(request).await?;
        response.into_result().map(|_| ())
    }

    async fn delete_message(&self, id: &MessageId) -> Result<()> {
        let request = self.request(Method::DELETE, &["Messages", "delete", id.as_str()])?;
        let response: ApiResponse<serde_json::Value> = self.send(request).await?;
        response.into_result().map(|_| ())
    }
}
