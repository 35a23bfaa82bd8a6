//! HTTP implementation of the "get current identity" call.
//!
//! Sends `GET {base_url}{current_identity_path}` with the stored access token
//! as a bearer credential.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use tutorhub_core::AuthError;
use tutorhub_core::config::ApiSettings;
use tutorhub_core::identity::{Identity, IdentityClient};
use tutorhub_core::session::{ACCESS_TOKEN_KEY, KeyValueStore};

/// Response shapes the API uses for the current user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdentityPayload {
    /// `{"data": {...}}`
    Envelope { data: Identity },
    /// `{"user": {...}}`
    User { user: Identity },
    /// The identity object itself
    Bare(Identity),
}

impl From<IdentityPayload> for Identity {
    fn from(payload: IdentityPayload) -> Self {
        match payload {
            IdentityPayload::Envelope { data } => data,
            IdentityPayload::User { user } => user,
            IdentityPayload::Bare(identity) => identity,
        }
    }
}

/// Identity client backed by the marketplace REST API.
#[derive(Clone)]
pub struct HttpIdentityClient {
    client: Client,
    url: String,
    timeout: Duration,
    store: Arc<dyn KeyValueStore>,
}

impl HttpIdentityClient {
    /// Creates a client for the configured API.
    ///
    /// # Arguments
    ///
    /// * `settings` - Base URL, endpoint path and timeout
    /// * `store` - Durable store the access token is read from on every call
    pub fn new(settings: &ApiSettings, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            client: Client::new(),
            url: settings.current_identity_url(),
            timeout: Duration::from_secs(settings.timeout_secs),
            store,
        }
    }

    /// Uses a preconfigured reqwest client (proxies, TLS roots).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn access_token(&self) -> Result<String, AuthError> {
        match self.store.get_item(ACCESS_TOKEN_KEY) {
            Ok(Some(token)) if !token.trim().is_empty() => Ok(token),
            Ok(_) => Err(AuthError::MissingCredential),
            Err(e) => {
                tracing::warn!("Failed to read access token: {}", e);
                Err(AuthError::MissingCredential)
            }
        }
    }
}

#[async_trait]
impl IdentityClient for HttpIdentityClient {
    async fn get_current_identity(&self) -> Result<Identity, AuthError> {
        let token = self.access_token()?;

        let response = self
            .client
            .get(&self.url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Transport(format!("Failed to read response: {}", e)))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        if !status.is_success() {
            return Err(AuthError::Server {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        parse_identity(&body)
    }
}

/// Parses an identity response body in any of the shapes the API returns.
pub fn parse_identity(body: &str) -> Result<Identity, AuthError> {
    serde_json::from_str::<IdentityPayload>(body)
        .map(Identity::from)
        .map_err(|e| AuthError::MalformedResponse(e.to_string()))
}

/// Extracts `message` (or `error`) from a JSON error body, else the raw text.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });

    from_json.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            "Unknown error".to_string()
        } else {
            trimmed.chars().take(200).collect()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    #[test]
    fn test_parse_bare_identity() {
        let identity = parse_identity(r#"{"id": "u1", "isTeacher": false}"#).unwrap();
        assert_eq!(identity, Identity::new("u1", false));
    }

    #[test]
    fn test_parse_envelopes() {
        let data = parse_identity(r#"{"success": true, "data": {"_id": "t1", "isTeacher": true}}"#)
            .unwrap();
        assert_eq!(data.id, "t1");
        assert!(data.is_teacher);

        let user = parse_identity(r#"{"user": {"id": "u2", "nickname": "Kim"}}"#).unwrap();
        assert_eq!(user.display_name(), "Kim");
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        assert!(matches!(
            parse_identity("<html>oops</html>"),
            Err(AuthError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_identity(r#"{"data": null}"#),
            Err(AuthError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(r#"{"message": "jwt expired"}"#), "jwt expired");
        assert_eq!(error_message(r#"{"error": "invalid token"}"#), "invalid token");
        assert_eq!(error_message("Unauthorized"), "Unauthorized");
        assert_eq!(error_message(""), "Unknown error");
    }

    #[tokio::test]
    async fn test_missing_token_fails_without_request() {
        let store = Arc::new(MemoryKeyValueStore::new());
        // Unroutable URL: reaching the network would produce a transport error instead
        let settings = ApiSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            ..ApiSettings::default()
        };
        let client = HttpIdentityClient::new(&settings, store);

        assert_eq!(
            client.get_current_identity().await,
            Err(AuthError::MissingCredential)
        );
        assert_eq!(client.url(), "http://127.0.0.1:9/auth/me");
    }
}
