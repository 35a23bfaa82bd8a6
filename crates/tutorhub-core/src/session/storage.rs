//! Durable key-value storage trait and the keys the session uses.

use crate::error::Result;

/// Key under which the `{identity, authenticated}` snapshot is stored.
pub const SESSION_NAMESPACE: &str = "tutorhub-auth";

/// Key holding the bearer token attached to API requests.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Key holding the refresh token, when the login flow issued one.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Every key that holds credential material.
pub const CREDENTIAL_KEYS: &[&str] = &[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY];

/// A durable string-to-string store that outlives the process.
///
/// Implementations must make each call atomic: a crash in the middle of
/// `set_item` leaves either the old or the new value, never a partial one.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}
