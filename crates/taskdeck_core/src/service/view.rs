//! Derived view over the task collection.
//!
//! # Responsibility
//! - Parse filter/sort names coming from the presentation layer.
//! - Compute the filtered, sorted, read-only projection of the collection.
//! - Provide the due-date predicates used by filters and highlighting.
//!
//! # Invariants
//! - Deriving a view never mutates or reorders the underlying collection.
//! - Sorting is stable; ties keep insertion order.
//! - Undated tasks sort after dated ones for both date orders.
//! - Unknown filter names mean `all`; unknown sort names mean unsorted.

use crate::model::task::Task;
use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

const DUE_SOON_WINDOW_HOURS: i64 = 24;

/// Which tasks the view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
    Today,
}

impl TaskFilter {
    /// Parses a presentation-layer filter name, falling back to `All`.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "active" => Self::Active,
            "completed" => Self::Completed,
            "today" => Self::Today,
            _ => Self::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Today => "today",
        }
    }

    pub fn matches(self, task: &Task, now: &DateTime<FixedOffset>) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
            Self::Today => is_due_today(task, now),
        }
    }
}

impl Display for TaskFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskSort {
    #[default]
    DateAsc,
    DateDesc,
    CreatedAsc,
    CreatedDesc,
    /// Filtered order as stored; chosen for unrecognized sort names.
    Unsorted,
}

impl TaskSort {
    /// Parses a presentation-layer sort name, falling back to `Unsorted`.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "dateAsc" => Self::DateAsc,
            "dateDesc" => Self::DateDesc,
            "createdAsc" => Self::CreatedAsc,
            "createdDesc" => Self::CreatedDesc,
            _ => Self::Unsorted,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateAsc => "dateAsc",
            Self::DateDesc => "dateDesc",
            Self::CreatedAsc => "createdAsc",
            Self::CreatedDesc => "createdDesc",
            Self::Unsorted => "unsorted",
        }
    }

    /// Comparator for this order. `None` for `Unsorted`.
    fn comparator(self) -> Option<fn(&Task, &Task) -> Ordering> {
        match self {
            Self::DateAsc => Some(by_due_ascending),
            Self::DateDesc => Some(by_due_descending),
            Self::CreatedAsc => Some(by_created_ascending),
            Self::CreatedDesc => Some(by_created_descending),
            Self::Unsorted => None,
        }
    }
}

impl Display for TaskSort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes the derived view of `tasks` under `filter` and `sort` at `now`.
pub fn derive_view<'a>(
    tasks: &'a [Task],
    filter: TaskFilter,
    sort: TaskSort,
    now: &DateTime<FixedOffset>,
) -> Vec<&'a Task> {
    let mut visible = tasks
        .iter()
        .filter(|task| filter.matches(task, now))
        .collect::<Vec<_>>();
    if let Some(compare) = sort.comparator() {
        visible.sort_by(|a, b| compare(a, b));
    }
    visible
}

fn by_due_ascending(a: &Task, b: &Task) -> Ordering {
    compare_due(a, b, false)
}

fn by_due_descending(a: &Task, b: &Task) -> Ordering {
    compare_due(a, b, true)
}

fn by_created_ascending(a: &Task, b: &Task) -> Ordering {
    a.created_at.cmp(&b.created_at)
}

fn by_created_descending(a: &Task, b: &Task) -> Ordering {
    b.created_at.cmp(&a.created_at)
}

fn compare_due(a: &Task, b: &Task, descending: bool) -> Ordering {
    match (a.datetime, b.datetime) {
        (Some(left), Some(right)) if descending => right.cmp(&left),
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// True when the task has a due date on `now`'s calendar day, read in
/// `now`'s offset. Completion is not considered.
pub fn is_due_today(task: &Task, now: &DateTime<FixedOffset>) -> bool {
    task.datetime
        .map(|due| due.with_timezone(now.offset()).date_naive() == now.date_naive())
        .unwrap_or(false)
}

/// True when the due date is strictly after `now` and at most 24 hours
/// ahead. Completion is not considered.
pub fn is_due_soon(task: &Task, now: &DateTime<FixedOffset>) -> bool {
    task.datetime
        .map(|due| {
            let remaining = due.signed_duration_since(*now);
            remaining > Duration::zero() && remaining <= Duration::hours(DUE_SOON_WINDOW_HOURS)
        })
        .unwrap_or(false)
}

/// Highlighting rule: open tasks that are due soon.
pub fn should_highlight_due_soon(task: &Task, now: &DateTime<FixedOffset>) -> bool {
    !task.completed && is_due_soon(task, now)
}

/// Aggregate counts over the whole collection, independent of the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            total: tasks.len(),
            pending: tasks.len() - completed,
            completed,
        }
    }
}

impl Display for TaskStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Total: {} • Pending: {} • Done: {}",
            self.total, self.pending, self.completed
        )
    }
}
