//! Configuration types for the device registry service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub ownership: OwnershipConfig,
}

/// Where the local device cache is persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Account session and endpoint used to mirror changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            authenticated: false,
            endpoint: default_endpoint(),
        }
    }
}

/// Ownership map supplied by the server for the signed-in account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnershipConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("devices.json")
}

fn default_endpoint() -> String {
    "http://localhost:5000/devices".to_string()
}

impl Config {
    pub fn validate(&self) -> crate::Result<()> {
        if self.sync.authenticated && self.sync.endpoint.trim().is_empty() {
            return Err(crate::RegistryError::Config(
                "sync.endpoint must be set for an authenticated session".to_string(),
            ));
        }
        if self.storage.path.as_os_str().is_empty() {
            return Err(crate::RegistryError::Config(
                "storage.path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::RegistryError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
