//! Unified path management for tutorhub files.
//!
//! ```text
//! ~/.config/tutorhub/          # Config directory
//! ├── config.toml              # Application configuration
//! └── storage.json             # Durable key-value store (session + tokens)
//! ```
//!
//! Every path can be rooted at a custom base directory instead, which is what
//! tests and the CLI's `--data-dir` flag use.

use std::path::{Path, PathBuf};

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Files managed by a tutorhub service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    /// config.toml
    Config,
    /// storage.json
    Storage,
}

/// Path resolver, optionally rooted at a base directory.
#[derive(Debug, Clone, Default)]
pub struct TutorhubPaths {
    base: Option<PathBuf>,
}

impl TutorhubPaths {
    const APP_DIR: &'static str = "tutorhub";

    /// Creates a resolver. `None` means the platform config directory.
    pub fn new(base_path: Option<&Path>) -> Self {
        Self {
            base: base_path.map(Path::to_path_buf),
        }
    }

    /// Returns the tutorhub configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: The base directory if one was given, otherwise e.g. `~/.config/tutorhub/`
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path for a service's file or directory.
    pub fn get_path(&self, service: ServiceType) -> Result<PathBuf, PathError> {
        let dir = self.config_dir()?;
        Ok(match service {
            ServiceType::Config => dir.join("config.toml"),
            ServiceType::Storage => dir.join("storage.json"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_base_override() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TutorhubPaths::new(Some(temp_dir.path()));

        assert_eq!(paths.config_dir().unwrap(), temp_dir.path());
        assert_eq!(
            paths.get_path(ServiceType::Config).unwrap(),
            temp_dir.path().join("config.toml")
        );
        assert_eq!(
            paths.get_path(ServiceType::Storage).unwrap(),
            temp_dir.path().join("storage.json")
        );
    }

    #[test]
    fn test_default_config_dir() {
        // Only meaningful where the platform has a config directory.
        if let Ok(dir) = TutorhubPaths::default().config_dir() {
            assert!(dir.ends_with("tutorhub"));
            let storage = TutorhubPaths::default()
                .get_path(ServiceType::Storage)
                .unwrap();
            assert!(storage.starts_with(&dir));
        }
    }
}
