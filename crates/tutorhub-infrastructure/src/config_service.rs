//! Configuration service implementation.
//!
//! Loads the root configuration from config.toml (~/.config/tutorhub/config.toml),
//! creating it with defaults on first use.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tutorhub_core::config::RootConfig;
use tutorhub_core::{Result, TutorhubError};

use crate::paths::{ServiceType, TutorhubPaths};

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "TUTORHUB_API_URL";

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a service for config.toml under the default directory, or
    /// under `base_path` when given. Nothing is read until first access.
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let path = TutorhubPaths::new(base_path)
            .get_path(ServiceType::Config)
            .map_err(|e| TutorhubError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a service for an explicit config file path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the root configuration, loading it from file if not cached.
    ///
    /// # Errors
    ///
    /// `TutorhubError::Config` if the file exists but is not valid TOML for
    /// [`RootConfig`]; I/O errors if a missing file cannot be created.
    pub fn get_config(&self) -> Result<RootConfig> {
        {
            let read_lock = self
                .config
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self
                .config
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *write_lock = None;
    }

    fn load_config(&self) -> Result<RootConfig> {
        let mut config = if self.path.exists() {
            let content = fs::read_to_string(&self.path)?;
            toml::from_str::<RootConfig>(&content).map_err(|e| {
                TutorhubError::config(format!("{}: {}", self.path.display(), e))
            })?
        } else {
            let default_config = RootConfig::default();
            self.write_default(&default_config)?;
            default_config
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::debug!("Using API base URL from {}", API_URL_ENV);
                config.api.base_url = url;
            }
        }

        Ok(config)
    }

    fn write_default(&self, config: &RootConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string_pretty(config)?)?;
        tracing::info!("Created default config at {}", self.path.display());
        Ok(())
    }
}
