//! FFI use-case API for shell-facing calls.
//!
//! # Responsibility
//! - Expose task commands and the derived view as flat, UI-friendly envelopes.
//! - Keep error semantics simple: `ok` plus a human-readable `message`.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Filter and sort live in process memory only and start as `all`/`dateAsc`.
//! - Every call reloads the collection from the store described by
//!   `CoreConfig::from_env()`, the same store the CLI reads, so the store is
//!   the single source of truth between calls.
//! - Load, mutate, and save run under one process-wide lock; concurrent
//!   calls never overwrite each other's snapshot.
//! - With the `memory` backend nothing survives between calls.

use chrono::FixedOffset;
use log::{error, warn};
use std::sync::{Mutex, MutexGuard, OnceLock};
use taskdeck_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    to_datetime_local_input, CommandOutcome, CoreConfig, KeyValueStore, TaskCommand, TaskEngine,
    TaskFilter, TaskSort, ViewSnapshot,
};

static ENTRY_CONFIG: OnceLock<Result<CoreConfig, String>> = OnceLock::new();
static ENGINE_LOCK: Mutex<()> = Mutex::new(());
static VIEW_CONFIG: Mutex<ViewConfig> = Mutex::new(ViewConfig {
    filter: TaskFilter::All,
    sort: TaskSort::DateAsc,
});

#[derive(Debug, Clone, Copy)]
struct ViewConfig {
    filter: TaskFilter,
    sort: TaskSort,
}

type EntryEngine = TaskEngine<Box<dyn KeyValueStore>>;

/// Minimal health-check API.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Result envelope for mutating commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    /// Id of the created task for `tasks_add`.
    pub task_id: Option<String>,
    /// Tasks affected; `0` for absent ids.
    pub affected: u32,
    pub message: String,
}

impl TaskActionResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            affected: 0,
            message: message.into(),
        }
    }
}

/// One rendered task row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskViewEntry {
    pub id: String,
    pub text: String,
    /// RFC 3339 due instant, if any.
    pub datetime: Option<String>,
    /// `YYYY-MM-DDTHH:MM` value for prefilling an edit form.
    pub datetime_local: Option<String>,
    pub completed: bool,
    pub created_at: String,
    pub due_today: bool,
    pub due_soon: bool,
    pub due_label: String,
}

/// Derived view plus counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskViewResponse {
    pub ok: bool,
    pub items: Vec<TaskViewEntry>,
    pub total: u32,
    pub pending: u32,
    pub completed: u32,
    pub filter: String,
    pub sort: String,
    pub message: String,
}

/// Adds a task. `datetime` accepts RFC 3339 or `datetime-local` values.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_add(text: String, datetime: Option<String>) -> TaskActionResponse {
    run_command("tasks_add", TaskCommand::Add { text, datetime })
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_toggle(id: String) -> TaskActionResponse {
    run_command("tasks_toggle", TaskCommand::Toggle { id })
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_edit(id: String, text: String, datetime: Option<String>) -> TaskActionResponse {
    run_command("tasks_edit", TaskCommand::Edit { id, text, datetime })
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_delete(id: String) -> TaskActionResponse {
    run_command("tasks_delete", TaskCommand::Delete { id })
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_clear_completed() -> TaskActionResponse {
    run_command("tasks_clear_completed", TaskCommand::ClearCompleted)
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_clear_all() -> TaskActionResponse {
    run_command("tasks_clear_all", TaskCommand::ClearAll)
}

/// Sets the view filter (`all|active|completed|today`) and returns the view.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_set_filter(name: String) -> TaskViewResponse {
    update_view_config(|config| config.filter = TaskFilter::from_name(&name));
    tasks_view()
}

/// Sets the view order (`dateAsc|dateDesc|createdAsc|createdDesc`) and
/// returns the view.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_set_sort(name: String) -> TaskViewResponse {
    update_view_config(|config| config.sort = TaskSort::from_name(&name));
    tasks_view()
}

/// Returns the current derived view and counts.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; storage failures yield `ok=false` and an empty list.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_view() -> TaskViewResponse {
    match with_engine(|engine| Ok((engine.snapshot(), *engine.now().offset()))) {
        Ok((snapshot, offset)) => to_view_response(snapshot, &offset),
        Err(message) => {
            let config = current_view_config();
            TaskViewResponse {
                ok: false,
                items: Vec::new(),
                total: 0,
                pending: 0,
                completed: 0,
                filter: config.filter.to_string(),
                sort: config.sort.to_string(),
                message: format!("tasks_view failed: {message}"),
            }
        }
    }
}

fn run_command(name: &str, command: TaskCommand) -> TaskActionResponse {
    let result = with_engine(|engine| {
        let outcome = engine.execute(command).map_err(|err| err.to_string())?;
        match engine.last_persist_error() {
            Some(err) => Err(format!("not saved: {err}")),
            None => Ok(outcome),
        }
    });

    match result {
        Ok(CommandOutcome::Created(id)) => TaskActionResponse {
            ok: true,
            task_id: Some(id.to_string()),
            affected: 1,
            message: "Task created.".to_string(),
        },
        Ok(CommandOutcome::Applied { affected }) => TaskActionResponse {
            ok: true,
            task_id: None,
            affected: saturating_u32(affected),
            message: if affected == 0 {
                "No matching task.".to_string()
            } else {
                format!("Updated {affected} task(s).")
            },
        },
        Ok(CommandOutcome::ViewChanged { .. }) => TaskActionResponse {
            ok: true,
            task_id: None,
            affected: 0,
            message: "View updated.".to_string(),
        },
        Err(message) => TaskActionResponse::failure(format!("{name} failed: {message}")),
    }
}

fn with_engine<T>(f: impl FnOnce(&mut EntryEngine) -> Result<T, String>) -> Result<T, String> {
    let _guard = lock_engine();
    let config = entry_config()?;
    let store = config
        .open_store()
        .map_err(|err| format!("store open failed: {err}"))?;
    let mut engine = TaskEngine::open_default(store);

    let view = current_view_config();
    engine.set_filter(view.filter.as_str());
    engine.set_sort(view.sort.as_str());
    f(&mut engine)
}

fn lock_engine() -> MutexGuard<'static, ()> {
    match ENGINE_LOCK.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("event=engine_lock module=ffi status=recovered_poisoned_lock");
            poisoned.into_inner()
        }
    }
}

fn entry_config() -> Result<&'static CoreConfig, String> {
    ENTRY_CONFIG
        .get_or_init(|| {
            CoreConfig::from_env().map_err(|err| {
                error!("event=config_load module=ffi status=error error={err}");
                format!("config load failed: {err}")
            })
        })
        .as_ref()
        .map_err(|message| message.clone())
}

fn current_view_config() -> ViewConfig {
    match VIEW_CONFIG.lock() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn update_view_config(update: impl FnOnce(&mut ViewConfig)) {
    match VIEW_CONFIG.lock() {
        Ok(mut guard) => update(&mut guard),
        Err(poisoned) => {
            warn!("event=view_config module=ffi status=recovered_poisoned_lock");
            update(&mut poisoned.into_inner());
        }
    }
}

fn to_view_response(snapshot: ViewSnapshot, offset: &FixedOffset) -> TaskViewResponse {
    let items = snapshot
        .items
        .into_iter()
        .map(|item| TaskViewEntry {
            id: item.task.id.to_string(),
            datetime: item.task.datetime.map(|due| due.to_rfc3339()),
            datetime_local: item
                .task
                .datetime
                .map(|due| to_datetime_local_input(&due, offset)),
            text: item.task.text,
            completed: item.task.completed,
            created_at: item.task.created_at.to_rfc3339(),
            due_today: item.due_today,
            due_soon: item.due_soon_highlight,
            due_label: item.due_label,
        })
        .collect::<Vec<_>>();

    let message = if items.is_empty() {
        "No tasks.".to_string()
    } else {
        format!("{} task(s).", items.len())
    };

    TaskViewResponse {
        ok: true,
        items,
        total: saturating_u32(snapshot.stats.total),
        pending: saturating_u32(snapshot.stats.pending),
        completed: saturating_u32(snapshot.stats.completed),
        filter: snapshot.filter.to_string(),
        sort: snapshot.sort.to_string(),
        message,
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
