//! Core domain logic for TaskDeck.
//! This crate is the single source of truth for task collection invariants.

pub mod config;
pub mod db;
pub mod display;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig, StorageBackend};
pub use display::{due_label, format_due_label};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::clock::{Clock, FixedClock, SystemClock};
pub use model::datetime::{normalize_datetime_input, to_datetime_local_input};
pub use model::id::{IdGenerator, MonotonicIdGenerator, UuidIdGenerator};
pub use model::task::{Task, TaskId, TaskValidationError};
pub use service::command::{CommandOutcome, TaskCommand, TaskViewItem, ViewSnapshot};
pub use service::task_engine::TaskEngine;
pub use service::view::{
    derive_view, is_due_soon, is_due_today, should_highlight_due_soon, TaskFilter, TaskSort,
    TaskStats,
};
pub use store::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, PersistenceError, PersistenceResult,
    SqliteKeyValueStore, TaskSnapshotStore, DEFAULT_STORAGE_KEY,
};

/// Minimal health-check API for shell integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
