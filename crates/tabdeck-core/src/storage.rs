//! Namespaced key-value stores.
//!
//! Two namespaces exist: `sync` holds user configuration and `local` holds
//! machine-local data such as the forecast cache. Both speak the same small
//! contract: read a set of keys into a JSON object, merge a JSON object back.
//! There are no transactions; callers that read-modify-write must serialise
//! themselves.

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::StorageError;

/// A JSON object of stored keys and values.
pub type Entries = Map<String, Value>;

/// Well-known storage keys.
pub mod keys {
    pub const NAME: &str = "name";
    pub const TIMEZONE: &str = "tz";
    pub const LOCATION_QUERY: &str = "wx";
    pub const LOCATION_COORDS: &str = "wx_coords";
    pub const LOCATION_LABEL: &str = "wx_label";
    pub const CALENDAR_IDS: &str = "calIds";
    /// Older key for selected calendars, adopted when `calIds` is empty.
    pub const LEGACY_CALENDAR_IDS: &str = "selCalIds";
    pub const FIRST_RUN: &str = "firstRun";
    pub const FORECAST_CACHE: &str = "wx_cache";
}

pub trait KeyValueStore: Send + Sync {
    /// Fetch the given keys. Missing keys are absent from the result.
    fn get(&self, keys: &[&str]) -> Result<Entries, StorageError>;

    /// Fetch every stored key.
    fn get_all(&self) -> Result<Entries, StorageError>;

    /// Merge `entries` into the store, replacing existing values.
    fn set(&self, entries: Entries) -> Result<(), StorageError>;
}

/// Typed helpers over any [`KeyValueStore`].
pub trait KeyValueStoreExt {
    fn get_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError>;

    fn set_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {
    fn get_value<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let mut entries = self.get(&[key])?;
        match entries.remove(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StorageError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
        }
    }

    fn set_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value).map_err(|e| StorageError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let mut entries = Entries::new();
        entries.insert(key.to_string(), value);
        self.set(entries)
    }
}

fn pick(all: &Entries, keys: &[&str]) -> Entries {
    keys.iter()
        .filter_map(|k| all.get(*k).map(|v| (k.to_string(), v.clone())))
        .collect()
}

/// Store persisted as a single JSON object in one file.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Result<Entries, StorageError> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }

        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| StorageError::ReadFailed {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        if contents.trim().is_empty() {
            return Ok(Entries::new());
        }

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StorageError::Corruption(self.path.display().to_string())),
            Err(e) => Err(StorageError::Corruption(format!(
                "{}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn write(&self, entries: &Entries) -> Result<(), StorageError> {
        let write_err = |message: String| StorageError::WriteFailed {
            path: self.path.display().to_string(),
            message,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(entries).map_err(|e| write_err(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| write_err(e.to_string()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, keys: &[&str]) -> Result<Entries, StorageError> {
        let _guard = self.lock.lock();
        Ok(pick(&self.read()?, keys))
    }

    fn get_all(&self) -> Result<Entries, StorageError> {
        let _guard = self.lock.lock();
        self.read()
    }

    fn set(&self, entries: Entries) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut all = self.read()?;
        all.extend(entries);
        self.write(&all)?;
        tracing::debug!("Wrote store {}", self.path.display());
        Ok(())
    }
}

/// In-memory store, used in tests and for throwaway sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Entries) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, keys: &[&str]) -> Result<Entries, StorageError> {
        Ok(pick(&self.entries.lock(), keys))
    }

    fn get_all(&self) -> Result<Entries, StorageError> {
        Ok(self.entries.lock().clone())
    }

    fn set(&self, entries: Entries) -> Result<(), StorageError> {
        self.entries.lock().extend(entries);
        Ok(())
    }
}

/// The `sync` and `local` namespaces.
#[derive(Clone)]
pub struct Stores {
    pub sync: Arc<dyn KeyValueStore>,
    pub local: Arc<dyn KeyValueStore>,
}

impl Stores {
    /// File-backed stores under `data_dir` (`sync.json`, `local.json`).
    pub fn open(data_dir: &Path) -> Self {
        Self {
            sync: Arc::new(JsonFileStore::new(data_dir.join("sync.json"))),
            local: Arc::new(JsonFileStore::new(data_dir.join("local.json"))),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            sync: Arc::new(MemoryStore::new()),
            local: Arc::new(MemoryStore::new()),
        }
    }
}
