use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const BACKEND_URL_ENV: &str = "SHOP_AGENT_BACKEND_URL";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub backend_url: Option<String>,
    /// Last shop URL synced from the dashboard. The API token is never stored.
    pub shop_url: Option<String>,
    pub shop_domain: Option<String>,
    pub cart_id: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Backend base URL: explicit override (flag or env, resolved by clap),
    /// then the config file, then the default.
    pub fn resolve_backend_url(&self, override_url: Option<&str>) -> String {
        let non_blank = |url: &&str| !url.trim().is_empty();
        override_url
            .filter(non_blank)
            .or(self.backend_url.as_deref().filter(non_blank))
            .unwrap_or(DEFAULT_BACKEND_URL)
            .trim()
            .trim_end_matches('/')
            .to_string()
    }

    /// Shop domain sent with chat requests; falls back to the last synced shop.
    pub fn effective_shop_domain(&self) -> Option<&str> {
        self.shop_domain
            .as_deref()
            .or(self.shop_url.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("shop-agent").join("config.json"))
    }
}
