//! Local key-value persistence.
//!
//! Session and saved-job state is kept under fixed string keys. The
//! `KeyValueStore` trait is the only capability the rest of the crate sees,
//! so tests swap in `MemoryStore` while the CLI uses `FileStore`.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Key holding the persisted `AuthRecord`.
pub const AUTH_KEY: &str = "eazyjobs_auth";

/// Key holding the saved-job list.
pub const SAVED_JOBS_KEY: &str = "eazyjobs_saved";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access stored value '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("stored value '{key}' is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// String-keyed persistence: get, set, remove.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl dyn KeyValueStore {
    /// Read and decode a JSON value. Malformed data is reported, not repaired.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set(key, &raw)
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn io_error(key: &str, source: io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(key, e))?;

        // Readers only ever see a complete file.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| Self::io_error(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| Self::io_error(key, e))?;

        tracing::trace!(key, path = %path.display(), "Persisted value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert!(store.contains("k"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert!(!store.contains("k"));
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        store.set(SAVED_JOBS_KEY, "[]").unwrap();

        let reopened = FileStore::new(dir.path().join("nested"));
        assert_eq!(reopened.get(SAVED_JOBS_KEY).unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested").join("eazyjobs_saved.json").exists());

        reopened.remove(SAVED_JOBS_KEY).unwrap();
        assert_eq!(store.get(SAVED_JOBS_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_missing_dir_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("never-created"));
        assert_eq!(store.get(AUTH_KEY).unwrap(), None);
        store.remove(AUTH_KEY).unwrap();
    }

    #[test]
    fn test_json_helpers() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set_json("nums", &vec![1, 2, 3]).unwrap();
        let nums: Option<Vec<u32>> = store.get_json("nums").unwrap();
        assert_eq!(nums, Some(vec![1, 2, 3]));

        let missing: Option<Vec<u32>> = store.get_json("other").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_corrupt_value_is_reported() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set("nums", "{not json").unwrap();
        let err = store.get_json::<Vec<u32>>("nums").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { ref key, .. } if key == "nums"));
    }
}
