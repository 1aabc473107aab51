//! Application configuration management.
//!
//! Handles loading and saving the client configuration, which includes the
//! backend base URL override and the last used login email.
//!
//! Configuration is stored at `~/.config/pesopay/config.json`; the
//! `PESOPAY_API_URL` environment variable overrides the base URL.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for the config directory path
const APP_NAME: &str = "pesopay";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default base path for the backend REST API
pub const DEFAULT_BASE_URL: &str = "https://api.pesopay.app/api/v1";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Effective base URL: environment override, then the config file
    /// value, then the production default.
    pub fn base_url(&self) -> String {
        std::env::var("PESOPAY_API_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }
}
