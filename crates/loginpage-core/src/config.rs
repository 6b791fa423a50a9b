//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the backend base URL, the token storage backend, and the
//! last email used to log in.
//!
//! Configuration is stored at `~/.config/loginpage/config.json`. The base URL
//! can also be set with the `LOGINPAGE_API_URL` environment variable, which
//! wins over the file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{FileTokenStore, KeyringTokenStore, TokenStore};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "loginpage";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when nothing overrides it
pub const DEFAULT_API_BASE_URL: &str = "https://login-page-project-production.up.railway.app";

/// Environment variable overriding the backend base URL
pub const API_URL_ENV: &str = "LOGINPAGE_API_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub token_backend: TokenBackend,
    #[serde(default)]
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
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

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Base URL of the backend, honoring `LOGINPAGE_API_URL`
    pub fn api_base_url(&self) -> String {
        self.resolve_base_url(std::env::var(API_URL_ENV).ok())
    }

    fn resolve_base_url(&self, from_env: Option<String>) -> String {
        let url = from_env
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        url.trim().trim_end_matches('/').to_string()
    }

    /// Open the configured durable token store
    pub fn open_token_store(&self) -> Result<Arc<dyn TokenStore>> {
        match self.token_backend {
            TokenBackend::File => {
                let dir = self.cache_dir()?;
                debug!(?dir, "Using file token store");
                let store = FileTokenStore::open(&dir).context("Failed to open token store")?;
                Ok(Arc::new(store))
            }
            TokenBackend::Keyring => {
                debug!("Using keychain token store");
                Ok(Arc::new(KeyringTokenStore::new()))
            }
        }
    }
}
