//! Client configuration, persisted as JSON under the platform config
//! directory. The file is read-only from the app's point of view; users
//! edit it by hand.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides every other source of the backend URL.
pub const BACKEND_URL_ENV: &str = "DOCCHAT_BACKEND_URL";

/// Where the answer backend listens by default.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub backend_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self { backend_url: None }
    }

    /// Load the config file, falling back to defaults when it does not exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if !config_path.exists() {
            return Ok(Self::new());
        }
        Self::load_from(&config_path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// The backend base URL: environment override first, then the config
    /// file, then the default.
    pub fn resolve_backend_url(&self) -> String {
        std::env::var(BACKEND_URL_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .or_else(|| self.backend_url.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("docchat").join("config.json"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
