//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the admin
//! service URL, request timeout, which storage backend holds the session
//! token, and the last admin id used to log in.
//!
//! Configuration is stored at `~/.config/kate-admin/config.json`. Environment
//! variables override the file (see [`Config::apply_env_overrides`]).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{FileStorage, KeyringStorage, MemoryStorage, Storage, StorageBackend};

/// Application name used for config/data directory paths
const APP_NAME: &str = "kate-admin";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Session storage file name in the data directory
const STORAGE_FILE: &str = "storage.json";

/// Default admin service base URL
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

/// HTTP request timeout in seconds.
/// The admin service is small; 10s fails fast without cutting off slow reports.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_API_URL: &str = "KATE_ADMIN_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "KATE_ADMIN_TIMEOUT_SECS";
pub const ENV_STORAGE: &str = "KATE_ADMIN_STORAGE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub storage: StorageBackend,
    /// Overrides the default session storage file location
    pub storage_path: Option<PathBuf>,
    pub last_admin_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            storage: StorageBackend::default(),
            storage_path: None,
            last_admin_id: None,
        }
    }
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

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Location of the session storage file for the file backend
    pub fn storage_file(&self) -> Result<PathBuf> {
        match self.storage_path {
            Some(ref path) => Ok(path.clone()),
            None => Ok(self.data_dir()?.join(STORAGE_FILE)),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Apply `KATE_ADMIN_*` environment variables on top of the loaded file
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("{} must be a whole number of seconds", ENV_TIMEOUT_SECS))?;
        }
        if let Some(backend) = lookup(ENV_STORAGE) {
            self.storage = backend
                .parse()
                .map_err(|e: String| anyhow::anyhow!("{}: {}", ENV_STORAGE, e))?;
        }
        Ok(())
    }

    /// Open the configured session storage backend
    pub fn open_storage(&self) -> Result<Arc<dyn Storage>> {
        let storage: Arc<dyn Storage> = match self.storage {
            StorageBackend::File => {
                let path = self.storage_file()?;
                debug!(?path, "Using file session storage");
                Arc::new(FileStorage::new(path))
            }
            StorageBackend::Keyring => Arc::new(KeyringStorage::new()),
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        };
        Ok(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kate-admin").join("config.json");

        let config = Config {
            api_base_url: "https://admin.example.test/api".to_string(),
            storage: StorageBackend::Keyring,
            last_admin_id: Some("42".to_string()),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"timeout_secs": 3}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_URL, " http://10.0.0.5:8000/api "),
            (ENV_TIMEOUT_SECS, "30"),
            (ENV_STORAGE, "memory"),
        ]);
        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.api_base_url, "http://10.0.0.5:8000/api");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.storage, StorageBackend::Memory);
    }

    #[test]
    fn test_env_override_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config
            .apply_overrides(|key| (key == ENV_TIMEOUT_SECS).then(|| "soon".to_string()))
            .is_err());
        assert!(config
            .apply_overrides(|key| (key == ENV_STORAGE).then(|| "redis".to_string()))
            .is_err());
    }

    #[test]
    fn test_explicit_storage_path() {
        let config = Config {
            storage_path: Some(PathBuf::from("/tmp/kate/storage.json")),
            ..Default::default()
        };
        assert_eq!(config.storage_file().unwrap(), PathBuf::from("/tmp/kate/storage.json"));
    }
}
