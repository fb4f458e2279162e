//! Human-facing labels for due dates.

use crate::model::task::Task;
use chrono::{DateTime, FixedOffset, Utc};

const DUE_LABEL_FORMAT: &str = "%a, %-d %b, %H:%M";
const NO_DUE_DATE_LABEL: &str = "No due date";

/// Friendly due label such as `Sun, 2 Jun, 14:30`, in `local_offset`.
pub fn format_due_label(due: &DateTime<Utc>, local_offset: &FixedOffset) -> String {
    due.with_timezone(local_offset)
        .format(DUE_LABEL_FORMAT)
        .to_string()
}

/// Due label for a task, or the "no due date" placeholder.
pub fn due_label(task: &Task, local_offset: &FixedOffset) -> String {
    task.datetime
        .as_ref()
        .map(|due| format_due_label(due, local_offset))
        .unwrap_or_else(|| NO_DUE_DATE_LABEL.to_string())
}
