//! Error types for the tutorhub client core.

use thiserror::Error;

/// A shared error type for storage, configuration and other infrastructure concerns.
///
/// Session mutations never surface this type: the session store absorbs
/// persistence failures and logs them instead.
#[derive(Error, Debug, Clone)]
pub enum TutorhubError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Durable key-value storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TutorhubError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<std::io::Error> for TutorhubError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TutorhubError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TutorhubError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for TutorhubError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, TutorhubError>`.
pub type Result<T> = std::result::Result<T, TutorhubError>;

/// Failure of the "get current identity" call.
///
/// The route guard treats every variant the same way (the session is cleared),
/// the distinction only matters for logging and for callers outside the guard.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential is stored, so the request was never sent.
    #[error("no credential available")]
    MissingCredential,

    /// The server refused the credential (expired, revoked or malformed).
    #[error("credential rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The server failed for a reason unrelated to the credential.
    #[error("identity endpoint error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The request never completed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not a valid identity.
    #[error("malformed identity response: {0}")]
    MalformedResponse(String),
}

impl AuthError {
    /// Returns true when the failure is caused by the credential itself.
    pub fn is_credential_error(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::Rejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_conversion_keeps_kind() {
        let err: TutorhubError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        match err {
            TutorhubError::Io { message } => assert!(message.contains("PermissionDenied")),
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_json_conversion_is_serialization() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err: TutorhubError = parse_err.into();
        assert!(err.is_serialization());
        assert!(err.to_string().starts_with("Serialization error: JSON"));
    }

    #[test]
    fn test_credential_errors() {
        assert!(AuthError::MissingCredential.is_credential_error());
        assert!(
            AuthError::Rejected {
                status: 401,
                message: "jwt expired".into()
            }
            .is_credential_error()
        );
        assert!(!AuthError::Transport("connection refused".into()).is_credential_error());
        assert!(
            !AuthError::Server {
                status: 500,
                message: "boom".into()
            }
            .is_credential_error()
        );
    }
}
