//! Server-supplied map of devices owned by the signed-in account
//!
//! Wire shape is a JSON object of `key -> [displayName, _, _, modelLabel]`.
//! Positions 1 and 2 are ignored. Entries with missing or non-string fields
//! are accepted with those fields left empty.

use std::fmt;
use std::path::Path;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;

/// Ownership record for a single device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipEntry {
    pub display_name: String,
    pub model_label: String,
}

impl OwnershipEntry {
    pub fn new(display_name: impl Into<String>, model_label: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            model_label: model_label.into(),
        }
    }

    fn from_value(value: &Value) -> Self {
        let field = |index: usize| {
            value
                .get(index)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            display_name: field(0),
            model_label: field(3),
        }
    }
}

/// Owned devices in the order the server listed them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipMap {
    entries: Vec<(String, OwnershipEntry)>,
}

impl OwnershipMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `key`, keeping its original position
    pub fn insert(&mut self, key: impl Into<String>, entry: OwnershipEntry) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((key, entry)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OwnershipEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OwnershipEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::RegistryError::Config(format!(
                "Failed to read ownership file {:?}: {}",
                path, e
            ))
        })?;
        let map = Self::from_json(&content)?;
        tracing::debug!("Loaded {} owned devices from {:?}", map.len(), path);
        Ok(map)
    }
}

struct OwnershipVisitor;

impl<'de> Visitor<'de> for OwnershipVisitor {
    type Value = OwnershipMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of device keys to ownership records")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = OwnershipMap::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            map.insert(key, OwnershipEntry::from_value(&value));
        }
        Ok(map)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(OwnershipMap::new())
    }
}

impl<'de> Deserialize<'de> for OwnershipMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(OwnershipVisitor)
    }
}
