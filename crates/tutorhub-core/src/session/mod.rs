//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: the in-memory session and its persisted forms
//! - `storage`: the durable key-value store interface and the keys in use

mod model;
mod storage;

pub use model::{PersistedSession, Session, SessionSnapshot};
pub use storage::{
    ACCESS_TOKEN_KEY, CREDENTIAL_KEYS, KeyValueStore, REFRESH_TOKEN_KEY, SESSION_NAMESPACE,
};
