//! File-backed key-value store for the task list and the preferences record.
//!
//! Each record is one JSON blob stored under a fixed key (`<key>.json` in
//! the data directory), read and written wholesale.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::preferences::{PreferenceStore, Preferences};
use crate::task::{Task, TaskStore};

pub const TODOS_KEY: &str = "todos";
pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub(crate) fn read<T: DeserializeOwned>(&self, key: &'static str) -> Result<Option<T>, StoreError> {
        let raw = match std::fs::read_to_string(self.path(key)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { key, source }),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Malformed { key, source })
    }

    /// Write to a sibling temp file, then rename over the blob.
    pub(crate) fn write<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::Malformed { key, source })?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|source| StoreError::Io { key, source })?;
        std::fs::rename(&tmp, &path).map_err(|source| StoreError::Io { key, source })
    }

    /// Delete the blob. Returns whether it existed.
    pub(crate) fn remove(&self, key: &'static str) -> Result<bool, StoreError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::Io { key, source }),
        }
    }
}

impl TaskStore for JsonStore {
    fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.read(TODOS_KEY)?.unwrap_or_default())
    }

    fn save_tasks(&self, tasks: &[Task]) -> Result<(), StoreError> {
        self.write(TODOS_KEY, tasks)
    }
}

impl PreferenceStore for JsonStore {
    fn get_preferences(&self) -> Result<Option<Preferences>, StoreError> {
        self.read(SETTINGS_KEY)
    }

    fn set_preferences(&self, prefs: &Preferences) -> Result<(), StoreError> {
        self.write(SETTINGS_KEY, prefs)
    }
}
