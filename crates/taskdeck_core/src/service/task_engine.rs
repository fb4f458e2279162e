//! Task collection engine.
//!
//! # Responsibility
//! - Own the in-memory task sequence and the view configuration.
//! - Apply create/toggle/edit/delete/clear mutations and persist after each.
//! - Expose the derived view and aggregate counts.
//!
//! # Invariants
//! - Ids are unique: every generated id is checked against the collection.
//! - A validation failure leaves the collection untouched.
//! - Persistence failures are logged and remembered, never propagated as
//!   mutation failures.
//! - Filter and sort reset to `all` / `dateAsc` whenever an engine is built.

use crate::model::clock::{Clock, SystemClock};
use crate::model::datetime::normalize_datetime_input;
use crate::model::id::{IdGenerator, UuidIdGenerator};
use crate::model::task::{normalize_text, Task, TaskId, TaskValidationError};
use crate::service::view::{self, TaskFilter, TaskSort, TaskStats};
use crate::store::{KeyValueStore, PersistenceResult, TaskSnapshotStore};
use chrono::{DateTime, FixedOffset, Utc};
use log::{debug, error, info};

/// Generated candidates tried before falling back to UUIDs.
const MAX_GENERATOR_ATTEMPTS: usize = 64;

pub struct TaskEngine<S: KeyValueStore, G: IdGenerator = UuidIdGenerator, C: Clock = SystemClock> {
    tasks: Vec<Task>,
    filter: TaskFilter,
    sort: TaskSort,
    store: TaskSnapshotStore<S>,
    ids: G,
    clock: C,
    dirty: bool,
    last_persist_error: Option<String>,
}

impl<S: KeyValueStore> TaskEngine<S> {
    /// Opens an engine with UUID ids and the system clock.
    pub fn open_default(store: TaskSnapshotStore<S>) -> Self {
        Self::open(store, UuidIdGenerator, SystemClock)
    }
}

impl<S: KeyValueStore, G: IdGenerator, C: Clock> TaskEngine<S, G, C> {
    /// Loads the stored collection and builds an engine around it.
    ///
    /// Missing or corrupt snapshots start an empty collection.
    pub fn open(store: TaskSnapshotStore<S>, ids: G, clock: C) -> Self {
        let tasks = store.load();
        info!(
            "event=engine_open module=engine status=ok backend={} count={}",
            store.backend().backend_name(),
            tasks.len()
        );
        Self {
            tasks,
            filter: TaskFilter::default(),
            sort: TaskSort::default(),
            store,
            ids,
            clock,
            dirty: false,
            last_persist_error: None,
        }
    }

    /// Tasks in canonical insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub fn sort(&self) -> TaskSort {
        self.sort
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &TaskSnapshotStore<S> {
        &self.store
    }

    /// Current evaluation instant with the local offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    /// Appends a new open task.
    ///
    /// # Errors
    /// - `EmptyText` when `text` trims to nothing.
    /// - `InvalidDatetime` when `datetime_input` is non-empty and unparseable.
    pub fn create(
        &mut self,
        text: &str,
        datetime_input: Option<&str>,
    ) -> Result<TaskId, TaskValidationError> {
        let now = self.clock.now();
        let text = normalize_text(text).map_err(|err| rejected("task_create", err))?;
        let datetime = normalize_datetime_input(datetime_input, now.offset())
            .map_err(|err| rejected("task_create", err))?;

        let id = self.allocate_id();
        let task = Task::new(id.clone(), &text, datetime, now.with_timezone(&Utc))?;
        self.tasks.push(task);
        info!(
            "event=task_create module=engine status=ok id={} has_due={} count={}",
            id,
            datetime.is_some(),
            self.tasks.len()
        );

        self.persist();
        Ok(id)
    }

    /// Flips completion. Returns whether a task with `id` existed.
    pub fn toggle_complete(&mut self, id: &str) -> bool {
        let found = match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                debug!(
                    "event=task_toggle module=engine status=ok id={id} completed={}",
                    task.completed
                );
                true
            }
            None => {
                debug!("event=task_toggle module=engine status=not_found id={id}");
                false
            }
        };
        self.persist();
        found
    }

    /// Replaces text and due date. Returns whether a task with `id` existed.
    ///
    /// # Errors
    /// - Same as `create`; the task is left unchanged.
    pub fn edit(
        &mut self,
        id: &str,
        text: &str,
        datetime_input: Option<&str>,
    ) -> Result<bool, TaskValidationError> {
        let now = self.clock.now();
        let text = normalize_text(text).map_err(|err| rejected("task_edit", err))?;
        let datetime = normalize_datetime_input(datetime_input, now.offset())
            .map_err(|err| rejected("task_edit", err))?;

        let found = match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.text = text;
                task.datetime = datetime;
                info!(
                    "event=task_edit module=engine status=ok id={id} has_due={}",
                    datetime.is_some()
                );
                true
            }
            None => {
                debug!("event=task_edit module=engine status=not_found id={id}");
                false
            }
        };
        self.persist();
        Ok(found)
    }

    /// Removes the task. Returns whether a task with `id` existed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let found = self.tasks.len() != before;
        info!("event=task_delete module=engine status=ok id={id} found={found}");
        self.persist();
        found
    }

    /// Removes every completed task. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        let removed = before - self.tasks.len();
        info!("event=task_clear module=engine status=ok scope=completed removed={removed}");
        self.persist();
        removed
    }

    /// Removes every task. Returns how many were removed.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();
        info!("event=task_clear module=engine status=ok scope=all removed={removed}");
        self.persist();
        removed
    }

    /// Sets the view filter by name; unknown names select `all`.
    pub fn set_filter(&mut self, name: &str) -> TaskFilter {
        self.filter = TaskFilter::from_name(name);
        self.filter
    }

    /// Sets the view order by name; unknown names leave the view unsorted.
    pub fn set_sort(&mut self, name: &str) -> TaskSort {
        self.sort = TaskSort::from_name(name);
        self.sort
    }

    /// Derived view at the clock's current instant.
    pub fn derive_view(&self) -> Vec<&Task> {
        self.derive_view_at(&self.clock.now())
    }

    /// Derived view at an explicit instant.
    pub fn derive_view_at(&self, now: &DateTime<FixedOffset>) -> Vec<&Task> {
        view::derive_view(&self.tasks, self.filter, self.sort, now)
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    pub fn is_due_today(&self, task: &Task) -> bool {
        view::is_due_today(task, &self.clock.now())
    }

    pub fn is_due_soon(&self, task: &Task) -> bool {
        view::is_due_soon(task, &self.clock.now())
    }

    /// Writes the full collection now, reporting the outcome.
    pub fn flush(&mut self) -> PersistenceResult<()> {
        let result = self.store.save(&self.tasks);
        self.record_save(&result);
        result
    }

    /// Message of the most recent failed save, cleared by the next success.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Whether in-memory state has changes the store has not accepted.
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    fn persist(&mut self) {
        let result = self.store.save(&self.tasks);
        self.record_save(&result);
    }

    fn record_save(&mut self, result: &PersistenceResult<()>) {
        match result {
            Ok(()) => {
                self.dirty = false;
                self.last_persist_error = None;
                debug!(
                    "event=snapshot_save module=engine status=ok backend={} count={}",
                    self.store.backend().backend_name(),
                    self.tasks.len()
                );
            }
            Err(err) => {
                self.dirty = true;
                self.last_persist_error = Some(err.to_string());
                error!(
                    "event=snapshot_save module=engine status=error backend={} error={}",
                    self.store.backend().backend_name(),
                    err
                );
            }
        }
    }

    fn allocate_id(&mut self) -> TaskId {
        for _ in 0..MAX_GENERATOR_ATTEMPTS {
            let candidate = self.ids.next_id();
            if !candidate.as_str().is_empty() && !self.contains_id(&candidate) {
                return candidate;
            }
            debug!("event=id_collision module=engine candidate={candidate}");
        }

        let mut fallback = UuidIdGenerator;
        loop {
            let candidate = fallback.next_id();
            if !self.contains_id(&candidate) {
                return candidate;
            }
        }
    }

    fn contains_id(&self, id: &TaskId) -> bool {
        self.tasks.iter().any(|task| &task.id == id)
    }
}

impl<S: KeyValueStore, G: IdGenerator, C: Clock> Drop for TaskEngine<S, G, C> {
    fn drop(&mut self) {
        if self.dirty {
            // Best effort; failure was already logged by the last save.
            let _ = self.flush();
        }
    }
}

fn rejected(event: &str, err: TaskValidationError) -> TaskValidationError {
    info!("event={event} module=engine status=rejected reason={}", err.code());
    err
}
