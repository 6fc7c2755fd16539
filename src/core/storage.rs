//! Key-value persistence shared by every store.
//!
//! Each store owns exactly one record under a fixed key and writes it back
//! after every mutation. Records are JSON text; a record that fails to parse
//! is reported as [`Loaded::Corrupt`] and the owning store decides how to
//! recover.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CREDENTIALS_KEY: &str = "system_credentials";
pub const SHORTCUTS_KEY: &str = "app_configs";
pub const WALLPAPER_KEY: &str = "wallpaper";
pub const SESSION_KEY: &str = "auth";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("{op} {}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// ── In-memory backend ─────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

// ── File backend ──────────────────────────────────────────────────────────────

/// One `<key>.json` file per record inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            op: "creating",
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.record_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                op: "reading",
                path,
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        std::fs::write(&path, value).map_err(|source| StorageError::Io {
            op: "writing",
            path,
            source,
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                op: "removing",
                path,
                source,
            }),
        }
    }
}

// ── Record helpers ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded<T> {
    Found(T),
    Missing,
    Corrupt,
}

pub fn load_record<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Loaded<T> {
    let text = match store.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => return Loaded::Missing,
        Err(err) => {
            tracing::warn!(key, error = %err, "unreadable record, treating as missing");
            return Loaded::Missing;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Loaded::Found(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "corrupt record");
            Loaded::Corrupt
        }
    }
}

/// Writes `value` under `key`. Failures are logged, not returned: a store
/// keeps serving its in-memory state when the backend rejects a write.
pub fn save_record<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to encode record");
            return;
        }
    };
    if let Err(err) = store.set(key, &json) {
        tracing::warn!(key, error = %err, "failed to persist record");
    }
}

pub fn clear_record(store: &dyn KeyValueStore, key: &str) {
    if let Err(err) = store.remove(key) {
        tracing::warn!(key, error = %err, "failed to remove record");
    }
}
