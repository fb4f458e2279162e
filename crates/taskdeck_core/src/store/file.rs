//! Directory-backed key-value backend.
//!
//! # Invariants
//! - Each key maps to `<dir>/<key>.json`.
//! - Writes go to a sibling temp file first and are renamed into place, so a
//!   crash mid-write leaves the previous value readable.

use super::{KeyValueStore, PersistenceError, PersistenceResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const VALUE_EXTENSION: &str = "json";

/// Stores each key as one file inside `dir`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        self.dir.as_path()
    }

    /// Returns the file that holds `key`.
    pub fn value_path(&self, key: &str) -> PersistenceResult<PathBuf> {
        if !is_safe_file_key(key) {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.{VALUE_EXTENSION}")))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>> {
        let path = self.value_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> PersistenceResult<()> {
        let path = self.value_path(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let tmp_path = self.dir.join(format!(".{key}.{VALUE_EXTENSION}.tmp"));
        fs::write(&tmp_path, value).map_err(|source| PersistenceError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &path).map_err(|source| PersistenceError::Io { path, source })
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

fn is_safe_file_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'))
}
