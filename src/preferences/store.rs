//! Key-value stores backing the settings.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use super::error::SettingsError;

/// Directory under the home directory that holds app data.
pub const APP_DIR: &str = ".pomodorocat";

/// File name of the settings store.
pub const SETTINGS_FILE: &str = "settings.json";

/// Durable key-value storage for preferences.
pub trait PreferencesStore: Send {
    /// Returns the value stored under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Result<Option<Value>, SettingsError>;

    /// Stores every entry in one write. On error none of them is stored.
    fn set_many(&mut self, entries: Map<String, Value>) -> Result<(), SettingsError>;

    /// Stores `value` under `key`.
    fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        let mut entries = Map::new();
        entries.insert(key.to_string(), value);
        self.set_many(entries)
    }
}

// ============================================================================
// JsonFileStore
// ============================================================================

/// Stores all keys in a single JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `~/.pomodorocat/settings.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(APP_DIR).join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, SettingsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            other => Err(SettingsError::Corrupt(serde::de::Error::custom(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            )))),
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PreferencesStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set_many(&mut self, entries: Map<String, Value>) -> Result<(), SettingsError> {
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(SettingsError::Corrupt(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "overwriting corrupt settings file");
                Map::new()
            }
            Err(e) => return Err(e),
        };

        let count = entries.len();
        map.extend(entries);
        self.write_map(&map)?;
        tracing::debug!(count, path = %self.path.display(), "settings stored");
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic elsewhere cannot leave the map half-updated, so a poisoned
    // lock still holds consistent data.
    fn values(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PreferencesStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        Ok(self.values().get(key).cloned())
    }

    fn set_many(&mut self, entries: Map<String, Value>) -> Result<(), SettingsError> {
        self.values().extend(entries);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
