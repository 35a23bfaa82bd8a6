//! Domain layer of the tutorhub client: identities, the session record,
//! route access rules and the pure guard decisions built on them.

pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod route;
pub mod session;

// Re-export common error types
pub use error::{AuthError, Result, TutorhubError};
