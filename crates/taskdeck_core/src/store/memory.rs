//! In-process key-value backend.

use super::{KeyValueStore, PersistenceResult};
use std::collections::HashMap;

/// Volatile map-backed store. Contents live as long as the value does.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds raw bytes under `key`, bypassing snapshot encoding.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn raw(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> PersistenceResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> PersistenceResult<()> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
