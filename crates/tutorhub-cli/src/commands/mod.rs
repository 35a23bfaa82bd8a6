pub mod check;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod status;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tutorhub_application::{IdentityRefresher, NavigationOutcome, SessionStore};
use tutorhub_core::config::RootConfig;
use tutorhub_infrastructure::{ConfigService, FileKeyValueStore, HttpIdentityClient};

/// Everything a command needs: configuration and the restored session.
pub struct Context {
    pub config: RootConfig,
    pub store: Arc<SessionStore>,
    storage: Arc<FileKeyValueStore>,
}

impl Context {
    pub fn open(data_dir: Option<&Path>) -> Result<Self> {
        let config = ConfigService::new(data_dir)?
            .get_config()
            .context("Failed to load config.toml")?;

        let storage = Arc::new(FileKeyValueStore::new(data_dir)?);
        let store = Arc::new(SessionStore::restore(storage.clone()));

        Ok(Self {
            config,
            store,
            storage,
        })
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage.path().to_path_buf()
    }

    /// Refresher talking to the configured API.
    pub fn refresher(&self) -> Arc<IdentityRefresher> {
        let client = HttpIdentityClient::new(&self.config.api, self.storage.clone());
        Arc::new(IdentityRefresher::new(self.store.clone(), Arc::new(client)))
    }
}

pub fn describe(outcome: &NavigationOutcome) -> String {
    match outcome {
        NavigationOutcome::Render { location, access } => {
            format!("render {} ({:?})", location, access)
        }
        NavigationOutcome::Redirect {
            to,
            return_to: Some(return_to),
        } => format!("redirect to {} (return to {})", to, return_to),
        NavigationOutcome::Redirect { to, return_to: None } => format!("redirect to {}", to),
    }
}
