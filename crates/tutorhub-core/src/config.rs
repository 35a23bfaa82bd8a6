//! Configuration model (config.toml).

use serde::{Deserialize, Serialize};

use crate::route::RouteRule;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_CURRENT_IDENTITY_PATH: &str = "/auth/me";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Root of config.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootConfig {
    /// Default tracing filter, used when `TUTORHUB_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub routes: RouteSettings,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api: ApiSettings::default(),
            routes: RouteSettings::default(),
        }
    }
}

/// Where the marketplace API lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the "get current identity" endpoint, relative to `base_url`.
    #[serde(default = "default_current_identity_path")]
    pub current_identity_path: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            current_identity_path: default_current_identity_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiSettings {
    /// Full URL of the current identity endpoint.
    pub fn current_identity_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.current_identity_path.trim_start_matches('/')
        )
    }
}

/// Redirect targets and extra route rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSettings {
    #[serde(default = "default_home_path")]
    pub home_path: String,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Rules checked before the built-in marketplace table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RouteRule>,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            home_path: default_home_path(),
            login_path: default_login_path(),
            rules: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_current_identity_path() -> String {
    DEFAULT_CURRENT_IDENTITY_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_home_path() -> String {
    "/".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}
