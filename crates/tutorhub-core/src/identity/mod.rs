//! Identity domain module.
//!
//! - `model`: the authenticated user's profile snapshot and credential tokens
//! - `client`: the "get current identity" collaborator interface

mod client;
mod model;

pub use client::IdentityClient;
pub use model::{AuthTokens, CREDENTIAL_FIELDS, Identity};
