use fs2::FileExt;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::errors::StoreError;

/// Key-value store persisted as one JSON object on disk.
///
/// Every operation takes a lock on a sidecar `<file>.lock`, so separate
/// processes sharing a state directory never interleave read-modify-write
/// cycles. Writes go through a temp file in the same directory and are
/// renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        lock_name.push(".lock");
        let lock_path = path.with_file_name(lock_name);
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
        let path = path.to_path_buf();
        move |source| StoreError::Io { path, source }
    }

    fn open_lock(&self) -> Result<File, StoreError> {
        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(self.io_err(parent))?;
        }
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(self.io_err(&self.lock_path))
    }

    fn read_map(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(self.io_err(&self.path))?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), StoreError> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        let content = serde_json::to_string_pretty(map).map_err(|source| StoreError::Encode {
            key: "*".to_string(),
            source,
        })?;

        let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(self.io_err(parent))?;
        temp.write_all(content.as_bytes())
            .map_err(self.io_err(temp.path()))?;
        temp.as_file().sync_all().map_err(self.io_err(temp.path()))?;
        temp.persist(&self.path)
            .map_err(|e| StoreError::Io {
                path: self.path.clone(),
                source: e.error,
            })?;
        Ok(())
    }

    fn with_shared<T>(
        &self,
        operation: impl FnOnce(&Map<String, Value>) -> T,
    ) -> Result<T, StoreError> {
        let lock_file = self.open_lock()?;
        FileExt::lock_shared(&lock_file).map_err(self.io_err(&self.lock_path))?;
        let map = self.read_map()?;
        let result = operation(&map);
        drop(lock_file);
        Ok(result)
    }

    fn with_exclusive(
        &self,
        operation: impl FnOnce(&mut Map<String, Value>),
    ) -> Result<(), StoreError> {
        let lock_file = self.open_lock()?;
        FileExt::lock_exclusive(&lock_file).map_err(self.io_err(&self.lock_path))?;
        let mut map = self.read_map()?;
        operation(&mut map);
        self.write_map(&map)?;
        drop(lock_file);
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.with_shared(|map| map.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.with_exclusive(|map| {
            map.insert(key.to_string(), value);
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.with_exclusive(|map| {
            map.remove(key);
        })
    }
}
