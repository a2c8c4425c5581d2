use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::fs::{self, File, create_dir_all};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::StoreError;

/// Key holding the session user
pub const USER_KEY: &str = "user";

/// Key holding the completed submission
pub const SUBMISSION_KEY: &str = "submission";

type Scopes = HashMap<String, HashMap<String, String>>;

/// String key-value store partitioned into scopes
///
/// Each browser session owns one scope. Values are JSON documents. There is
/// no versioning: the last write wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, scope: &str, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, scope: &str, key: &str, value: String) -> Result<(), StoreError>;

    /// Write only when `key` is empty. Returns `false` if a value was already there.
    fn set_if_absent(&self, scope: &str, key: &str, value: String) -> Result<bool, StoreError>;

    fn remove(&self, scope: &str, key: &str) -> Result<(), StoreError>;
}

/// Read and decode a JSON value
///
/// # Arguments
/// * `store` - Backend to read from
/// * `scope` - Session scope
/// * `key` - Key inside the scope
///
/// # Returns
/// * `Ok(None)` when nothing is stored under the key
///
/// # Errors
/// * `StoreError::Serialization` if the stored value is not a valid `T`
pub fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    scope: &str,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(scope, key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and write a JSON value, replacing any previous one
///
/// # Arguments
/// * `store` - Backend to write to
/// * `scope` - Session scope
/// * `key` - Key inside the scope
/// * `value` - Value to encode
pub fn set_json<T: Serialize>(
    store: &dyn KeyValueStore,
    scope: &str,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    store.set(scope, key, serde_json::to_string(value)?)
}

/// Load a JSON document from `path`, creating the file and its directory when missing
///
/// A missing or empty file yields `T::default()`.
///
/// # Errors
/// * `StoreError::Io` if the directory or file cannot be created or read
/// * `StoreError::Serialization` if the file holds something other than a `T`
pub fn load_json_file<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            create_dir_all(parent)?;
        }
    }

    if !path.exists() {
        let mut file = File::create(path)?;
        file.write_all(b"{}")?;
        return Ok(T::default());
    }

    let mut contents = String::new();
    File::open(path)?.read_to_string(&mut contents)?;
    if contents.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(&contents)?)
}

/// Write `value` to `path` as pretty-printed JSON
pub fn save_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn put(scopes: &mut Scopes, scope: &str, key: &str, value: String) {
    scopes
        .entry(scope.to_string())
        .or_default()
        .insert(key.to_string(), value);
}

fn take(scopes: &mut Scopes, scope: &str, key: &str) {
    if let Some(entries) = scopes.get_mut(scope) {
        entries.remove(key);
        if entries.is_empty() {
            scopes.remove(scope);
        }
    }
}

fn occupied(scopes: &Scopes, scope: &str, key: &str) -> bool {
    scopes.get(scope).is_some_and(|entries| entries.contains_key(key))
}

/// In-process store, lost on restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    scopes: RwLock<Scopes>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scopes currently holding at least one key
    pub fn scope_count(&self) -> usize {
        self.scopes.read().map(|scopes| scopes.len()).unwrap_or(0)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, scope: &str, key: &str) -> Result<Option<String>, StoreError> {
        let scopes = self.scopes.read().map_err(|_| StoreError::Poisoned)?;
        Ok(scopes.get(scope).and_then(|entries| entries.get(key)).cloned())
    }

    fn set(&self, scope: &str, key: &str, value: String) -> Result<(), StoreError> {
        let mut scopes = self.scopes.write().map_err(|_| StoreError::Poisoned)?;
        put(&mut scopes, scope, key, value);
        Ok(())
    }

    fn set_if_absent(&self, scope: &str, key: &str, value: String) -> Result<bool, StoreError> {
        let mut scopes = self.scopes.write().map_err(|_| StoreError::Poisoned)?;
        if occupied(&scopes, scope, key) {
            return Ok(false);
        }
        put(&mut scopes, scope, key, value);
        Ok(true)
    }

    fn remove(&self, scope: &str, key: &str) -> Result<(), StoreError> {
        let mut scopes = self.scopes.write().map_err(|_| StoreError::Poisoned)?;
        take(&mut scopes, scope, key);
        Ok(())
    }
}

/// Store mirrored to a JSON file after every write
///
/// Layout: `{ "<scope>": { "<key>": "<json>" } }`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    scopes: RwLock<Scopes>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating the file and its directory if needed
    ///
    /// # Errors
    /// * `StoreError::Io` if the file cannot be created or read
    /// * `StoreError::Serialization` if the file is not a scope map
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let scopes: Scopes = load_json_file(&path)?;

        log::debug!("opened store file {} with {} scopes", path.display(), scopes.len());

        Ok(JsonFileStore {
            path,
            scopes: RwLock::new(scopes),
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, scope: &str, key: &str) -> Result<Option<String>, StoreError> {
        let scopes = self.scopes.read().map_err(|_| StoreError::Poisoned)?;
        Ok(scopes.get(scope).and_then(|entries| entries.get(key)).cloned())
    }

    fn set(&self, scope: &str, key: &str, value: String) -> Result<(), StoreError> {
        let mut scopes = self.scopes.write().map_err(|_| StoreError::Poisoned)?;
        put(&mut scopes, scope, key, value);
        save_json_file(&self.path, &*scopes)
    }

    fn set_if_absent(&self, scope: &str, key: &str, value: String) -> Result<bool, StoreError> {
        let mut scopes = self.scopes.write().map_err(|_| StoreError::Poisoned)?;
        if occupied(&scopes, scope, key) {
            return Ok(false);
        }
        put(&mut scopes, scope, key, value);
        save_json_file(&self.path, &*scopes)?;
        Ok(true)
    }

    fn remove(&self, scope: &str, key: &str) -> Result<(), StoreError> {
        let mut scopes = self.scopes.write().map_err(|_| StoreError::Poisoned)?;
        if !occupied(&scopes, scope, key) {
            return Ok(());
        }
        take(&mut scopes, scope, key);
        save_json_file(&self.path, &*scopes)
    }
}
