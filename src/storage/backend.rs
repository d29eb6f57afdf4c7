//! Key/value backends for the key store.
//!
//! Values are JSON documents. The persisted and the unlocked tier each get
//! their own backend instance, so clearing one can never touch the other.
//! Values are only ever replaced or removed whole.

use crate::error::{Result, SdkError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Minimal storage contract used by [`crate::storage::keystore::KeyStore`].
pub trait KeyStorage: Send {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    /// Remove `key`, returning whether it existed.
    fn remove(&mut self, key: &str) -> Result<bool>;

    /// All keys in ascending order.
    fn keys(&self) -> Result<Vec<String>>;

    fn clear(&mut self) -> Result<()>;
}

/// Process-local storage; contents vanish with the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: BTreeMap<String, Value>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}

/// A JSON object file holding every entry, rewritten whole on each mutation.
///
/// The in-memory view only changes once the new file is in place.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl FileStorage {
    /// Load `file_name` from `directory`, creating an empty file if absent.
    pub fn open(directory: &Path, file_name: &str) -> Result<Self> {
        let path = directory.join(file_name);

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let entries: BTreeMap<String, Value> = serde_json::from_str(&contents)?;
            Ok(Self { path, entries })
        } else {
            fs::create_dir_all(directory)?;
            let entries = BTreeMap::new();
            write_entries(&path, &entries)?;
            Ok(Self { path, entries })
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy, persist it, then adopt it.
    fn commit(&mut self, change: impl FnOnce(&mut BTreeMap<String, Value>)) -> Result<()> {
        let mut next = self.entries.clone();
        change(&mut next);
        write_entries(&self.path, &next)?;
        self.entries = next;
        Ok(())
    }
}

/// Write to a sibling temp file, then rename over the original.
fn write_entries(path: &Path, entries: &BTreeMap<String, Value>) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path).map_err(|e| {
        SdkError::Keystore(format!("Failed to replace {}: {}", path.display(), e))
    })
}

impl KeyStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.commit(|entries| {
            entries.insert(key.to_string(), value);
        })
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        if !self.entries.contains_key(key) {
            return Ok(false);
        }
        self.commit(|entries| {
            entries.remove(key);
        })?;
        Ok(true)
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn clear(&mut self) -> Result<()> {
        self.commit(BTreeMap::clear)
    }
}
