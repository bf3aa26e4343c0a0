//! Key-value stores for persisted view-state
//!
//! The reconciler only ever uses one key, but hosts (like an editor's
//! workspace state) hand it a whole store, so resetting means clearing
//! every key.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, trace};

use super::error::{ExplorerError, Result};

/// Core trait for persisted key-value storage
pub trait KeyValueStore: Send {
    /// Get the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, overwriting any prior value
    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    /// Remove `key`, returning whether it was present
    fn remove(&mut self, key: &str) -> Result<bool>;

    /// All keys currently stored
    fn keys(&self) -> Vec<String>;

    /// Remove every key
    fn clear(&mut self) -> Result<()> {
        for key in self.keys() {
            self.remove(&key)?;
        }
        Ok(())
    }
}

/// In-process store, lost when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
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

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// Store kept as a single JSON object in a file
///
/// The file is read once on open and rewritten on every mutation.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                ExplorerError::store_error(format!("{} is not a JSON object: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "Opened state store");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `entries` to disk; callers adopt them only once this succeeds
    fn flush(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content).map_err(|e| {
            ExplorerError::store_error(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        trace!(path = %self.path.display(), "Flushed state store");
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let mut entries = self.entries.clone();
        entries.insert(key.to_string(), value);
        self.flush(&entries)?;
        self.entries = entries;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        if !self.entries.contains_key(key) {
            return Ok(false);
        }
        let mut entries = self.entries.clone();
        entries.remove(key);
        self.flush(&entries)?;
        self.entries = entries;
        Ok(true)
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("state").unwrap(), None);

        store.set("state", json!({"types": []})).unwrap();
        assert_eq!(store.get("state").unwrap(), Some(json!({"types": []})));
        assert_eq!(store.keys(), vec!["state".to_string()]);

        assert!(store.remove("state").unwrap());
        assert!(!store.remove("state").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_removes_every_key() {
        let mut store = MemoryStore::new();
        store.set("state", json!(1)).unwrap();
        store.set("other", json!(2)).unwrap();
        store.clear().unwrap();
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.keys().is_empty());
        store.set("state", json!({"types": [{"name": "Foo"}]})).unwrap();
        assert!(path.exists());

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("state").unwrap(),
            Some(json!({"types": [{"name": "Foo"}]}))
        );
    }

    #[test]
    fn test_file_store_rejects_non_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let result = JsonFileStore::open(&path);
        assert!(matches!(result, Err(ExplorerError::Store { .. })));
    }

    #[test]
    fn test_file_store_empty_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "").unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_failed_write_leaves_entries_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("kept", json!(1)).unwrap();

        // A directory in place of the file makes every write fail
        fs::remove_file(&path).unwrap();
        fs::create_dir_all(&path).unwrap();

        assert!(store.set("state", json!({"types": []})).is_err());
        assert_eq!(store.get("state").unwrap(), None);

        assert!(store.remove("kept").is_err());
        assert_eq!(store.get("kept").unwrap(), Some(json!(1)));
        assert_eq!(store.keys(), vec!["kept".to_string()]);
    }
}
