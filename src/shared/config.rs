//! Application configuration. Backend selection, API endpoint, paths.

use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Which adapter set backs the stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Http,
    /// Empty in-process collections; nothing leaves the machine.
    Memory,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// REST API root. Read from EVENT_BOARD_BASE_API_URL.
    #[serde(default)]
    pub base_api_url: Option<String>,

    #[serde(default)]
    pub backend: Option<Backend>,

    /// Where workspaces.json lives. Read from EVENT_BOARD_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Workspace token to open at startup. Read from EVENT_BOARD_TOKEN.
    #[serde(default)]
    pub token: Option<String>,

    /// Saved workspace to restore when no token is given. Read from EVENT_BOARD_WORKSPACE_TAG.
    #[serde(default)]
    pub workspace_tag: Option<String>,

    /// Per-request HTTP timeout. Unset means the transport default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Drop an entity from the cache even when its delete request fails.
    #[serde(default)]
    pub prune_on_failed_remove: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("EVENT_BOARD_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c = c.add_source(config::Environment::with_prefix("EVENT_BOARD").try_parsing(true));
        c.build()?.try_deserialize()
    }

    pub fn base_api_url_or_default(&self) -> String {
        self.base_api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_API_URL.to_string())
    }

    pub fn backend_or_default(&self) -> Backend {
        self.backend.unwrap_or_default()
    }

    pub fn data_dir_or_default(&self) -> String {
        self.data_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn prune_on_failed_remove_or_default(&self) -> bool {
        self.prune_on_failed_remove.unwrap_or(false)
    }

    /// Startup token, ignoring blank values from an empty `.env` entry.
    pub fn startup_token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.base_api_url_or_default(), "http://localhost:8000");
        assert_eq!(cfg.backend_or_default(), Backend::Http);
        assert_eq!(cfg.data_dir_or_default(), "./data");
        assert!(cfg.request_timeout().is_none());
        assert!(!cfg.prune_on_failed_remove_or_default());
    }

    #[test]
    fn test_deserializes_from_config_source() {
        let cfg: AppConfig = config::Config::builder()
            .set_override("backend", "memory")
            .unwrap()
            .set_override("request_timeout_secs", 5)
            .unwrap()
            .set_override("token", "  ")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.backend_or_default(), Backend::Memory);
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(cfg.startup_token(), None);
    }
}
