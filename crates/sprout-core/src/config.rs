//! Application configuration management.
//!
//! The config file mirrors an app manifest: connection settings live under
//! an `extra` section, next to the last email used to sign in.
//!
//! Configuration is stored at `~/.config/sprout/config.json`. The API URL
//! and timeout can be overridden with `SPROUT_API_URL` and
//! `SPROUT_API_TIMEOUT_SECS`; overrides are never written back to disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::mutation::RetryPolicy;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "sprout";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Base URL used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// HTTP request timeout used when nothing is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Login is not idempotent, so it is not retried unless configured.
pub const DEFAULT_LOGIN_RETRIES: u32 = 0;

const API_URL_ENV: &str = "SPROUT_API_URL";
const API_TIMEOUT_ENV: &str = "SPROUT_API_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtraConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_retries: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub extra: ExtraConfig,
    pub last_email: Option<String>,

    /// Environment overrides, applied on top of `extra`.
    #[serde(skip)]
    overrides: ExtraConfig,
}

impl Config {
    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(API_TIMEOUT_ENV).ok(),
        );
        Ok(config)
    }

    /// Like `load`, but falls back to defaults (plus environment overrides)
    /// when the file cannot be read.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            let mut config = Self::default();
            config.apply_overrides(
                std::env::var(API_URL_ENV).ok(),
                std::env::var(API_TIMEOUT_ENV).ok(),
            );
            config
        })
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
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

    /// Apply `SPROUT_API_URL` / `SPROUT_API_TIMEOUT_SECS` style overrides.
    pub fn apply_overrides(&mut self, api_url: Option<String>, timeout_secs: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.overrides.api_url = Some(url.trim().to_string());
        }
        if let Some(raw) = timeout_secs {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.overrides.api_timeout_secs = Some(secs),
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", API_TIMEOUT_ENV),
            }
        }
    }

    pub fn api_base_url(&self) -> String {
        self.overrides
            .api_url
            .clone()
            .or_else(|| self.extra.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .overrides
            .api_timeout_secs
            .or(self.extra.api_timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn login_retry_policy(&self) -> RetryPolicy {
        let retries = self.extra.login_retries.unwrap_or(DEFAULT_LOGIN_RETRIES);
        RetryPolicy::default().with_max_retries(retries)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
