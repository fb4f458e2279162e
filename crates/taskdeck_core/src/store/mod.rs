//! Persistence adapter for the task collection.
//!
//! # Responsibility
//! - Define the key-value capability the engine persists through.
//! - Provide memory, file, and SQLite backends for that capability.
//! - Serialize the whole collection as one snapshot under a fixed key.
//!
//! # Invariants
//! - Backends store opaque bytes and never interpret snapshot content.
//! - Snapshot loading never fails towards the engine; corrupt or missing
//!   data reads as an empty collection.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod file;
pub mod memory;
pub mod snapshot;
pub mod sqlite;

pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use snapshot::{TaskSnapshotStore, DEFAULT_STORAGE_KEY};
pub use sqlite::SqliteKeyValueStore;

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Storage read/write failure. Logged by the engine, never fatal to it.
#[derive(Debug)]
pub enum PersistenceError {
    Db(DbError),
    Io { path: PathBuf, source: std::io::Error },
    Encode(serde_json::Error),
    Decode(serde_json::Error),
    InvalidKey(String),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io { path, source } => write!(f, "i/o error at `{}`: {source}", path.display()),
            Self::Encode(err) => write!(f, "failed to encode task snapshot: {err}"),
            Self::Decode(err) => write!(f, "failed to decode task snapshot: {err}"),
            Self::InvalidKey(key) => write!(f, "invalid storage key `{key}`"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Encode(err) | Self::Decode(err) => Some(err),
            Self::InvalidKey(_) => None,
        }
    }
}

impl From<DbError> for PersistenceError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous key-value capability.
///
/// `get` returns `Ok(None)` for absent keys. `set` replaces the whole value.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>>;
    fn set(&mut self, key: &str, value: &[u8]) -> PersistenceResult<()>;

    /// Short backend label used in log lines.
    fn backend_name(&self) -> &'static str;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> PersistenceResult<()> {
        (**self).set(key, value)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}
