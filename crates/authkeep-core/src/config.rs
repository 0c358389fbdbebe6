//! Application configuration management.
//!
//! This module handles loading and saving the configuration, which covers
//! the API base URL, endpoint paths, token storage backend, locale and the
//! last email used to log in.
//!
//! Configuration is stored at `~/.config/authkeep/config.json`. Environment
//! variables override the file:
//!
//! - `AUTHKEEP_API_URL`: API base URL
//! - `AUTHKEEP_TOKEN_BACKEND`: `file`, `keyring` or `memory`
//! - `AUTHKEEP_LOCALE`: `en` or `ru`
//! - `AUTHKEEP_TIMEOUT_SECS`: request timeout in seconds

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::transport::DEFAULT_TIMEOUT_SECS;
use crate::api::Endpoints;
use crate::messages::{Locale, Messages};
use crate::store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenBackend, TokenStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "authkeep";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// API base URL when neither the file nor the environment sets one
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

pub const ENV_API_URL: &str = "AUTHKEEP_API_URL";
pub const ENV_TOKEN_BACKEND: &str = "AUTHKEEP_TOKEN_BACKEND";
pub const ENV_LOCALE: &str = "AUTHKEEP_LOCALE";
pub const ENV_TIMEOUT_SECS: &str = "AUTHKEEP_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub endpoints: Endpoints,
    pub token_backend: TokenBackend,
    pub locale: Locale,
    pub request_timeout_secs: u64,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            endpoints: Endpoints::default(),
            token_backend: TokenBackend::default(),
            locale: Locale::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            last_email: None,
        }
    }
}

impl Config {
    /// Load from the config file (if any), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
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

    /// Apply overrides from `lookup` (normally the process environment).
    /// Unparseable values are logged and ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TOKEN_BACKEND) {
            match TokenBackend::parse(&raw) {
                Some(backend) => self.token_backend = backend,
                None => warn!(value = %raw, "Ignoring unknown {}", ENV_TOKEN_BACKEND),
            }
        }
        if let Some(raw) = lookup(ENV_LOCALE) {
            match Locale::parse(&raw) {
                Some(locale) => self.locale = locale,
                None => warn!(value = %raw, "Ignoring unknown {}", ENV_LOCALE),
            }
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = secs,
                _ => warn!(value = %raw, "Ignoring invalid {}", ENV_TIMEOUT_SECS),
            }
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn messages(&self) -> Messages {
        Messages::new(self.locale)
    }

    /// Open the configured token store.
    ///
    /// If it cannot be opened, falls back to an in-memory store: the session
    /// still works for this run but nothing survives a restart.
    pub fn open_token_store(&self) -> Arc<dyn TokenStore> {
        match self.token_backend {
            TokenBackend::File => match self.data_dir().and_then(|dir| FileTokenStore::open(&dir)) {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    warn!(error = %e, "Token file unavailable, tokens will not persist");
                    Arc::new(MemoryTokenStore::new())
                }
            },
            TokenBackend::Keyring => Arc::new(KeyringTokenStore::new()),
            TokenBackend::Memory => Arc::new(MemoryTokenStore::new()),
        }
    }
}
