//! Application configuration management.
//!
//! Configuration is stored at `~/.config/billdesk/config.json`. The API base
//! URL and login email can be overridden from the environment
//! (`BILLDESK_API_URL`, `BILLDESK_EMAIL`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::{client::DEFAULT_TIMEOUT_SECS, DEFAULT_BASE_URL};
use crate::auth::{CredentialCache, FileCredentialCache, KeyringCredentialCache};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "billdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "BILLDESK_API_URL";
pub const ENV_EMAIL: &str = "BILLDESK_EMAIL";
pub const ENV_PASSWORD: &str = "BILLDESK_PASSWORD";

const DEFAULT_REVALIDATE_MINUTES: u64 = 15;

/// Where the credential hint is kept between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_email: Option<String>,
    #[serde(default)]
    pub credential_backend: CredentialBackend,
    pub request_timeout_secs: Option<u64>,
    pub revalidate_minutes: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load the config, falling back to defaults if it cannot be read.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Could not load config, using defaults");
                Self::default()
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
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

    /// Directory for the dashboard data cache.
    pub fn data_dir(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join("data"))
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join("logs"))
    }

    pub fn api_base_url(&self) -> String {
        self.resolve_base_url(non_empty_env(ENV_API_URL))
    }

    fn resolve_base_url(&self, from_env: Option<String>) -> String {
        from_env
            .or_else(|| self.api_base_url.clone().filter(|url| !url.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Email to prefill in the login form.
    pub fn login_email(&self) -> Option<String> {
        non_empty_env(ENV_EMAIL).or_else(|| self.last_email.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|&secs| secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn revalidate_interval(&self) -> Duration {
        let minutes = self
            .revalidate_minutes
            .filter(|&m| m > 0)
            .unwrap_or(DEFAULT_REVALIDATE_MINUTES);
        Duration::from_secs(minutes * 60)
    }

    /// Open the configured durable credential cache.
    pub fn credential_cache(&self) -> Result<Box<dyn CredentialCache>> {
        Ok(match self.credential_backend {
            CredentialBackend::File => Box::new(FileCredentialCache::new(self.cache_dir()?)),
            CredentialBackend::Keyring => Box::new(KeyringCredentialCache::new()),
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.resolve_base_url(None), DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.revalidate_interval(), Duration::from_secs(15 * 60));
        assert_eq!(config.credential_backend, CredentialBackend::File);
    }

    #[test]
    fn test_base_url_precedence() {
        let config = Config {
            api_base_url: Some("https://billing.example.com/api".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_base_url(None), "https://billing.example.com/api");
        assert_eq!(
            config.resolve_base_url(Some("http://10.0.0.2:3000/api".to_string())),
            "http://10.0.0.2:3000/api"
        );

        let blank = Config {
            api_base_url: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.resolve_base_url(None), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_zero_durations_fall_back() {
        let config = Config {
            request_timeout_secs: Some(0),
            revalidate_minutes: Some(0),
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.revalidate_interval(), Duration::from_secs(15 * 60));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = Config {
            last_email: Some("owner@example.com".to_string()),
            credential_backend: CredentialBackend::Keyring,
            revalidate_minutes: Some(5),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.last_email.as_deref(), Some("owner@example.com"));
        assert_eq!(loaded.credential_backend, CredentialBackend::Keyring);
        assert_eq!(loaded.revalidate_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_missing_file_is_default_and_garbage_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        assert!(Config::load_from(&path).unwrap().last_email.is_none());

        std::fs::write(&path, "{ nope").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"last_email": "a@b.com"}"#).unwrap();
        assert_eq!(config.credential_backend, CredentialBackend::File);
        assert!(config.api_base_url.is_none());
    }
}
