//! Ordered set of device keys and its string encoding

use serde::{Deserialize, Serialize};

/// Delimiter used by [`PipeCodec`]
pub const DELIMITER: char = '|';

/// Device keys in first-seen order, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSet {
    keys: Vec<String>,
}

impl DeviceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `key` unless already present. Returns true if the set changed.
    pub fn insert(&mut self, key: &str) -> bool {
        if self.contains(key) {
            return false;
        }
        self.keys.push(key.to_string());
        true
    }

    /// Remove `key` if present. Returns true if the set changed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k != key);
        self.keys.len() != before
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for DeviceSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = DeviceSet::new();
        for key in iter {
            set.insert(key);
        }
        set
    }
}

/// Serializer/deserializer pair for storing a [`DeviceSet`] as one string
pub trait SetCodec: Send + Sync {
    fn encode(&self, set: &DeviceSet) -> String;

    fn decode(&self, raw: &str) -> DeviceSet;
}

/// Keys joined by `|`
///
/// Keys are not escaped: a key containing the delimiter is split into
/// several keys on the next decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipeCodec;

impl SetCodec for PipeCodec {
    fn encode(&self, set: &DeviceSet) -> String {
        let mut out = String::new();
        for (i, key) in set.iter().enumerate() {
            if i > 0 {
                out.push(DELIMITER);
            }
            out.push_str(key);
        }
        out
    }

    fn decode(&self, raw: &str) -> DeviceSet {
        raw.split(DELIMITER).filter(|k| !k.is_empty()).collect()
    }
}
