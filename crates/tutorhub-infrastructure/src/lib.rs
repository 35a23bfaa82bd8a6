//! Infrastructure for the tutorhub client: file locations, durable key-value
//! storage, configuration loading and the HTTP identity client.

pub mod config_service;
pub mod http_identity_client;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::http_identity_client::HttpIdentityClient;
pub use crate::storage::{FileKeyValueStore, MemoryKeyValueStore};
