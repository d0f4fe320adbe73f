//! Persistent key/value storage for plugin data
//!
//! One JSON document, namespaced by plugin name:
//! `{ "files": { "config": { ... } } }`.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct BlobStore {
    path: Option<PathBuf>,
    data: Map<String, Value>,
}

impl BlobStore {
    /// Load the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            match serde_json::from_str::<Value>(&content)
                .with_context(|| format!("Invalid data store {}", path.display()))?
            {
                Value::Object(map) => map,
                _ => anyhow::bail!("Data store {} is not a JSON object", path.display()),
            }
        } else {
            Map::new()
        };

        Ok(Self {
            path: Some(path),
            data,
        })
    }

    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<Value> {
        self.data.get(namespace)?.get(key).cloned()
    }

    pub fn set(&mut self, namespace: &str, key: &str, value: Value) -> Result<()> {
        let section = self
            .data
            .entry(namespace)
            .or_insert_with(|| Value::Object(Map::new()));
        if !section.is_object() {
            *section = Value::Object(Map::new());
        }
        if let Value::Object(section) = section {
            section.insert(key.to_string(), value);
        }
        self.save()
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            crate::utils::ensure_dir_exists(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!("Saved plugin data to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = BlobStore::open(temp.path().join("data.json")).unwrap();
        assert_eq!(store.get("files", "config"), None);
    }

    #[test]
    fn test_set_persists_across_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/data.json");

        let mut store = BlobStore::open(&path).unwrap();
        store.set("files", "config", json!({"max_depth": 3})).unwrap();
        store.set("apps", "config", json!({"terminal": "foot"})).unwrap();

        let reopened = BlobStore::open(&path).unwrap();
        assert_eq!(reopened.get("files", "config"), Some(json!({"max_depth": 3})));
        assert_eq!(reopened.get("apps", "config"), Some(json!({"terminal": "foot"})));
        assert_eq!(reopened.get("files", "other"), None);
    }

    #[test]
    fn test_corrupt_store_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        fs::write(&path, "[1, 2").unwrap();
        assert!(BlobStore::open(&path).is_err());

        fs::write(&path, "[1, 2]").unwrap();
        assert!(BlobStore::open(&path).is_err());
    }

    #[test]
    fn test_in_memory_store_never_writes() {
        let mut store = BlobStore::in_memory();
        store.set("files", "config", json!(null)).unwrap();
        assert_eq!(store.get("files", "config"), Some(json!(null)));
        assert!(store.path().is_none());
    }
}
