//! Identity domain model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Profile keys that carry credential material and must never be persisted
/// alongside the identity.
pub const CREDENTIAL_FIELDS: &[&str] = &[
    "token",
    "accessToken",
    "refreshToken",
    "password",
    "passwordHash",
];

/// The authenticated user's profile snapshot.
///
/// An identity is treated as immutable once loaded: a refresh replaces it
/// wholesale. Fields the client does not know about are kept in `profile`
/// so that a persisted identity round-trips exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Unique user identifier
    #[serde(alias = "_id")]
    pub id: String,

    /// Privileged role flag. In the marketplace this is the teacher role,
    /// which unlocks the teacher dashboard and course management views.
    #[serde(default)]
    pub is_teacher: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Remaining profile fields, preserved verbatim.
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl Identity {
    /// Creates an identity with only an id and the privileged flag set.
    pub fn new(id: impl Into<String>, is_teacher: bool) -> Self {
        Self {
            id: id.into(),
            is_teacher,
            username: None,
            nickname: None,
            email: None,
            avatar: None,
            profile: Map::new(),
        }
    }

    /// Sets the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the display nickname.
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Whether this identity carries the privileged (teacher) role.
    pub fn is_privileged(&self) -> bool {
        self.is_teacher
    }

    /// Name to show in the UI: nickname, then username, then id.
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(&self.id)
    }

    /// Returns a copy with every credential-bearing profile field removed.
    pub fn without_credentials(mut self) -> Self {
        for key in CREDENTIAL_FIELDS {
            self.profile.remove(*key);
        }
        self
    }

    /// Whether any credential-bearing field is present.
    pub fn has_credentials(&self) -> bool {
        CREDENTIAL_FIELDS
            .iter()
            .any(|key| self.profile.contains_key(*key))
    }
}

/// Credential material issued by the login flow.
///
/// Stored under dedicated keys, separately from the session snapshot.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl AuthTokens {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }
}

// Never print token values.
impl fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTokens")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_user() {
        let json = r#"{
            "_id": "65f0c1",
            "isTeacher": true,
            "username": "alice",
            "nickname": "Alice",
            "bio": "Piano teacher",
            "token": "secret-jwt"
        }"#;

        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.id, "65f0c1");
        assert!(identity.is_privileged());
        assert_eq!(identity.display_name(), "Alice");
        assert_eq!(identity.profile.get("bio").unwrap(), "Piano teacher");
        assert!(identity.has_credentials());
    }

    #[test]
    fn test_missing_role_flag_defaults_to_unprivileged() {
        let identity: Identity = serde_json::from_str(r#"{"id": "u1"}"#).unwrap();
        assert!(!identity.is_privileged());
        assert_eq!(identity.display_name(), "u1");
    }

    #[test]
    fn test_without_credentials_keeps_profile() {
        let mut identity = Identity::new("u1", false).with_username("bob");
        identity
            .profile
            .insert("accessToken".into(), Value::String("abc".into()));
        identity
            .profile
            .insert("city".into(), Value::String("Osaka".into()));

        let clean = identity.without_credentials();
        assert!(!clean.has_credentials());
        assert_eq!(clean.profile.get("city").unwrap(), "Osaka");
        assert_eq!(clean.username.as_deref(), Some("bob"));

        let json = serde_json::to_string(&clean).unwrap();
        assert!(!json.contains("abc"));
    }

    #[test]
    fn test_tokens_debug_is_redacted() {
        let tokens = AuthTokens::new("access-123").with_refresh_token("refresh-456");
        let printed = format!("{:?}", tokens);
        assert!(!printed.contains("access-123"));
        assert!(!printed.contains("refresh-456"));
    }
}
