//! Key-value store abstraction backing the local device cache
//!
//! Mirrors the browser storage the registry was designed against: flat
//! string keys, string values, synchronous access, no expiry.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::RegistryError;

/// Key holding the joined Local Device Set
pub const DEVICES_KEY: &str = "devices";

/// Store key for the cached info label of a device
pub fn info_key(device: &str) -> String {
    format!("info-{}", device)
}

/// Store key for the user-chosen name of a device
pub fn name_key(device: &str) -> String {
    format!("name-{}", device)
}

/// String key-value storage injected into the registry
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> crate::Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> crate::Result<()>;
}

/// Volatile in-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> crate::Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| RegistryError::Storage("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> crate::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| RegistryError::Storage("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store persisted as a flat JSON object on disk
///
/// The whole file is rewritten on every `set`. A missing file is an empty
/// store; an unreadable or corrupt one is logged and treated as empty so the
/// registry keeps working in local-only mode.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Ignoring corrupt store file {:?}: {}", path, e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Store file {:?} does not exist yet", path);
                BTreeMap::new()
            }
            Err(e) => {
                tracing::warn!("Store file {:?} unavailable: {}", path, e);
                BTreeMap::new()
            }
        };

        tracing::debug!("Opened store {:?} with {} entries", path, entries.len());
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> crate::Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| RegistryError::Storage("file store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> crate::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| RegistryError::Storage("file store lock poisoned".to_string()))?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}
