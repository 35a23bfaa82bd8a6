//! Identity client trait.

use async_trait::async_trait;

use super::model::Identity;
use crate::error::AuthError;

/// Fetches the identity of the currently logged-in user.
///
/// Implementations attach the credential themselves (for example a bearer
/// token read from durable storage); callers never pass it in. A missing,
/// expired or rejected credential must surface as an [`AuthError`] so the
/// caller can drop the session.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    async fn get_current_identity(&self) -> Result<Identity, AuthError>;
}
