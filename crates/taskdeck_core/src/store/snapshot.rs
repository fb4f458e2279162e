//! Whole-collection snapshot persistence under one storage key.
//!
//! # Responsibility
//! - Encode the task sequence as one JSON array and hand it to a backend.
//! - Decode it back, treating absence and an unreadable payload as "no data"
//!   and skipping individual records that cannot be read.
//!
//! # Invariants
//! - `load(save(tasks)) == tasks` for every valid task sequence.
//! - Records that violate task invariants never reach the engine.

use super::{KeyValueStore, PersistenceError, PersistenceResult};
use crate::model::task::Task;
use log::{debug, warn};
use std::collections::HashSet;

/// Storage key used when configuration does not name one.
pub const DEFAULT_STORAGE_KEY: &str = "taskdeck_tasks_v1";

/// Binds a key-value backend to the fixed task snapshot key.
pub struct TaskSnapshotStore<S: KeyValueStore> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> TaskSnapshotStore<S> {
    pub fn new(backend: S, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// Uses `DEFAULT_STORAGE_KEY`.
    pub fn with_default_key(backend: S) -> Self {
        Self::new(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Reads and decodes the stored snapshot.
    ///
    /// Returns `Ok(None)` when the key is absent. The payload must be a JSON
    /// array; elements that do not decode as a task are skipped one by one.
    /// Invariant checks and duplicate removal happen in `load`.
    pub fn try_load(&self) -> PersistenceResult<Option<Vec<Task>>> {
        let Some(bytes) = self.backend.get(self.key.as_str())? else {
            return Ok(None);
        };
        let records = serde_json::from_slice::<Vec<serde_json::Value>>(&bytes)
            .map_err(PersistenceError::Decode)?;
        let tasks = records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value::<Task>(record) {
                Ok(task) => Some(task),
                Err(err) => {
                    warn!(
                        "event=snapshot_load module=store status=skip_record reason=decode index={index} category={:?}",
                        err.classify()
                    );
                    None
                }
            })
            .collect();
        Ok(Some(tasks))
    }

    /// Loads the collection, falling back to empty on any failure.
    ///
    /// Invalid records and repeated ids are dropped; the first occurrence of
    /// an id wins.
    pub fn load(&self) -> Vec<Task> {
        match self.try_load() {
            Ok(Some(tasks)) => {
                let tasks = sanitize_loaded(tasks);
                debug!(
                    "event=snapshot_load module=store status=ok backend={} count={}",
                    self.backend.backend_name(),
                    tasks.len()
                );
                tasks
            }
            Ok(None) => {
                debug!(
                    "event=snapshot_load module=store status=empty backend={}",
                    self.backend.backend_name()
                );
                Vec::new()
            }
            Err(err) => {
                warn!(
                    "event=snapshot_load module=store status=error backend={} error={}",
                    self.backend.backend_name(),
                    err
                );
                Vec::new()
            }
        }
    }

    /// Encodes and writes the full collection.
    pub fn save(&mut self, tasks: &[Task]) -> PersistenceResult<()> {
        let bytes = serde_json::to_vec(tasks).map_err(PersistenceError::Encode)?;
        self.backend.set(self.key.as_str(), &bytes)
    }
}

fn sanitize_loaded(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(tasks.len());
    tasks
        .into_iter()
        .filter(|task| {
            if let Err(err) = task.validate() {
                warn!(
                    "event=snapshot_load module=store status=skip_record reason={}",
                    err.code()
                );
                return false;
            }
            if !seen.insert(task.id.clone()) {
                warn!(
                    "event=snapshot_load module=store status=skip_record reason=duplicate_id id={}",
                    task.id
                );
                return false;
            }
            true
        })
        .collect()
}
