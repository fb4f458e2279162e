//! Core configuration.
//!
//! # Responsibility
//! - Describe which storage backend and key the engine persists to.
//! - Load settings from an optional TOML file plus environment overrides.
//!
//! # Invariants
//! - A missing config file yields defaults, never an error.
//! - `storage_key` always matches `STORAGE_KEY_RE` after loading.
//!
//! Environment variables:
//! - `TASKDECK_CONFIG`: path of the TOML file.
//! - `TASKDECK_STORAGE_KEY`, `TASKDECK_BACKEND`, `TASKDECK_DB_PATH`,
//!   `TASKDECK_LOG_LEVEL`, `TASKDECK_LOG_DIR`: per-field overrides.

use crate::logging::default_log_level;
use crate::store::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, PersistenceResult,
    SqliteKeyValueStore, TaskSnapshotStore, DEFAULT_STORAGE_KEY,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "TASKDECK_CONFIG";
const STORAGE_KEY_ENV: &str = "TASKDECK_STORAGE_KEY";
const BACKEND_ENV: &str = "TASKDECK_BACKEND";
const DB_PATH_ENV: &str = "TASKDECK_DB_PATH";
const LOG_LEVEL_ENV: &str = "TASKDECK_LOG_LEVEL";
const LOG_DIR_ENV: &str = "TASKDECK_LOG_DIR";

const DEFAULT_SQLITE_FILE_NAME: &str = "taskdeck.sqlite3";
const DEFAULT_FILE_STORE_DIR_NAME: &str = "taskdeck";

static STORAGE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{0,63}$").expect("valid key regex"));

/// Where snapshots are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    File,
    #[default]
    Sqlite,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "file" => Some(Self::File),
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Sqlite => "sqlite",
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    InvalidStorageKey(String),
    InvalidBackend(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidStorageKey(key) => write!(
                f,
                "invalid storage_key `{key}`; expected 1-64 chars of [A-Za-z0-9_.-]"
            ),
            Self::InvalidBackend(value) => {
                write!(f, "unsupported backend `{value}`; expected memory|file|sqlite")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidStorageKey(_) | Self::InvalidBackend(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub storage_key: String,
    pub backend: StorageBackend,
    /// Database file for `sqlite`, directory for `file`. Defaults under the
    /// system temp dir.
    pub path: Option<PathBuf>,
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            backend: StorageBackend::default(),
            path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`; a missing file yields defaults.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Loads the file named by `TASKDECK_CONFIG` (if any), then applies
    /// environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let lookup = |name: &str| std::env::var(name).ok();
        let base = match lookup(CONFIG_PATH_ENV).filter(|value| !value.trim().is_empty()) {
            Some(path) => Self::load_from_path(path.trim())?,
            None => Self::default(),
        };
        base.with_overrides(lookup)
    }

    /// Applies per-field overrides from `lookup`; blank values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(key) = get(STORAGE_KEY_ENV) {
            self.storage_key = key;
        }
        if let Some(raw) = get(BACKEND_ENV) {
            self.backend = StorageBackend::parse(&raw).ok_or(ConfigError::InvalidBackend(raw))?;
        }
        if let Some(path) = get(DB_PATH_ENV) {
            self.path = Some(PathBuf::from(path));
        }
        if let Some(level) = get(LOG_LEVEL_ENV) {
            self.log_level = level;
        }
        if let Some(dir) = get(LOG_DIR_ENV) {
            self.log_dir = Some(PathBuf::from(dir));
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !STORAGE_KEY_RE.is_match(&self.storage_key) {
            return Err(ConfigError::InvalidStorageKey(self.storage_key.clone()));
        }
        Ok(())
    }

    /// Storage location after applying backend defaults.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        match self.backend {
            StorageBackend::Memory => None,
            StorageBackend::File => Some(
                self.path
                    .clone()
                    .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_FILE_STORE_DIR_NAME)),
            ),
            StorageBackend::Sqlite => Some(
                self.path
                    .clone()
                    .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_SQLITE_FILE_NAME)),
            ),
        }
    }

    /// Opens the configured backend bound to the configured key.
    pub fn open_store(&self) -> PersistenceResult<TaskSnapshotStore<Box<dyn KeyValueStore>>> {
        let backend: Box<dyn KeyValueStore> = match (self.backend, self.resolved_path()) {
            (StorageBackend::File, Some(dir)) => Box::new(FileKeyValueStore::new(dir)),
            (StorageBackend::Sqlite, Some(path)) => Box::new(SqliteKeyValueStore::open(path)?),
            _ => Box::new(MemoryKeyValueStore::new()),
        };
        Ok(TaskSnapshotStore::new(backend, self.storage_key.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, StorageBackend};
    use crate::store::DEFAULT_STORAGE_KEY;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.backend, StorageBackend::Sqlite);
    }

    #[test]
    fn toml_fields_are_read() {
        let config = CoreConfig::from_toml_str(
            r#"
            storage_key = "my_tasks"
            backend = "file"
            path = "/var/lib/taskdeck"
            log_level = "warn"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage_key, "my_tasks");
        assert_eq!(config.backend, StorageBackend::File);
        assert_eq!(config.resolved_path(), Some(PathBuf::from("/var/lib/taskdeck")));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn invalid_storage_key_is_rejected() {
        let err = CoreConfig::from_toml_str(r#"storage_key = "../escape""#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStorageKey(_)));
    }

    #[test]
    fn overrides_win_over_file_values_and_blank_values_are_ignored() {
        let config = CoreConfig::default()
            .with_overrides(lookup_from(&[
                ("TASKDECK_BACKEND", "memory"),
                ("TASKDECK_STORAGE_KEY", "  "),
                ("TASKDECK_LOG_LEVEL", "error"),
            ]))
            .unwrap();
        assert_eq!(config.backend, StorageBackend::Memory);
        assert_eq!(config.backend.as_str(), "memory");
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.log_level, "error");
        assert_eq!(config.resolved_path(), None);
    }

    #[test]
    fn unknown_backend_override_is_rejected() {
        let err = CoreConfig::default()
            .with_overrides(lookup_from(&[("TASKDECK_BACKEND", "redis")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBackend(value) if value == "redis"));
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::load_from_path(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CoreConfig::default());
    }

    #[test]
    fn memory_backend_store_round_trips() {
        let config = CoreConfig {
            backend: StorageBackend::Memory,
            ..CoreConfig::default()
        };
        let mut store = config.open_store().unwrap();
        store.save(&[]).unwrap();
        assert_eq!(store.try_load().unwrap(), Some(Vec::new()));
        assert_eq!(store.key(), DEFAULT_STORAGE_KEY);
    }
}
