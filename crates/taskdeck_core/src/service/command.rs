//! Command boundary between a presentation shell and the engine.
//!
//! # Responsibility
//! - Accept discrete user commands as data.
//! - Produce a render-ready snapshot (view items + counts) after each one.
//!
//! # Invariants
//! - `execute` never partially applies a command; validation failures are
//!   returned before any mutation.
//! - Snapshots are owned copies; holding one never borrows the engine.

use crate::display::due_label;
use crate::model::clock::Clock;
use crate::model::id::IdGenerator;
use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::service::task_engine::TaskEngine;
use crate::service::view::{
    is_due_today, should_highlight_due_soon, TaskFilter, TaskSort, TaskStats,
};
use crate::store::KeyValueStore;

/// One user action from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCommand {
    Add {
        text: String,
        datetime: Option<String>,
    },
    Toggle {
        id: String,
    },
    Edit {
        id: String,
        text: String,
        datetime: Option<String>,
    },
    Delete {
        id: String,
    },
    ClearCompleted,
    ClearAll,
    SetFilter(String),
    SetSort(String),
}

impl TaskCommand {
    /// Whether the command changes the stored collection.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::SetFilter(_) | Self::SetSort(_))
    }
}

/// Result of one executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Created(TaskId),
    /// Number of tasks the command touched; `0` for absent ids.
    Applied { affected: usize },
    ViewChanged { filter: TaskFilter, sort: TaskSort },
}

/// One row of the rendered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskViewItem {
    pub task: Task,
    pub due_today: bool,
    /// Open and due within 24 hours.
    pub due_soon_highlight: bool,
    pub due_label: String,
}

/// Everything a shell needs to redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub items: Vec<TaskViewItem>,
    pub stats: TaskStats,
    pub filter: TaskFilter,
    pub sort: TaskSort,
}

impl ViewSnapshot {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: KeyValueStore, G: IdGenerator, C: Clock> TaskEngine<S, G, C> {
    /// Applies one command.
    ///
    /// # Errors
    /// - `TaskValidationError` from add/edit; nothing is mutated.
    pub fn execute(&mut self, command: TaskCommand) -> Result<CommandOutcome, TaskValidationError> {
        let outcome = match command {
            TaskCommand::Add { text, datetime } => {
                CommandOutcome::Created(self.create(&text, datetime.as_deref())?)
            }
            TaskCommand::Toggle { id } => CommandOutcome::Applied {
                affected: usize::from(self.toggle_complete(&id)),
            },
            TaskCommand::Edit { id, text, datetime } => CommandOutcome::Applied {
                affected: usize::from(self.edit(&id, &text, datetime.as_deref())?),
            },
            TaskCommand::Delete { id } => CommandOutcome::Applied {
                affected: usize::from(self.delete(&id)),
            },
            TaskCommand::ClearCompleted => CommandOutcome::Applied {
                affected: self.clear_completed(),
            },
            TaskCommand::ClearAll => CommandOutcome::Applied {
                affected: self.clear_all(),
            },
            TaskCommand::SetFilter(name) => {
                self.set_filter(&name);
                self.view_changed()
            }
            TaskCommand::SetSort(name) => {
                self.set_sort(&name);
                self.view_changed()
            }
        };
        Ok(outcome)
    }

    /// Builds the render snapshot at the clock's current instant.
    pub fn snapshot(&self) -> ViewSnapshot {
        let now = self.now();
        let items = self
            .derive_view_at(&now)
            .into_iter()
            .map(|task| TaskViewItem {
                due_today: is_due_today(task, &now),
                due_soon_highlight: should_highlight_due_soon(task, &now),
                due_label: due_label(task, now.offset()),
                task: task.clone(),
            })
            .collect();

        ViewSnapshot {
            items,
            stats: self.stats(),
            filter: self.filter(),
            sort: self.sort(),
        }
    }

    fn view_changed(&self) -> CommandOutcome {
        CommandOutcome::ViewChanged {
            filter: self.filter(),
            sort: self.sort(),
        }
    }
}
