//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted task record and its wire shape.
//! - Validate task text before any record is created or updated.
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes.
//! - `created_at` is fixed at creation.
//! - `text` is stored trimmed and is never empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque task identifier.
///
/// Serialized as a bare string so persisted snapshots stay readable by
/// other consumers of the same storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for TaskId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TaskId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Validation errors for task input and stored task shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Text is empty after trimming.
    EmptyText,
    /// Id is empty; only reachable through deserialized records.
    EmptyId,
    /// A non-empty due date input could not be parsed.
    InvalidDatetime(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text cannot be empty"),
            Self::EmptyId => write!(f, "task id cannot be empty"),
            Self::InvalidDatetime(value) => write!(f, "invalid due date input `{value}`"),
        }
    }
}

impl TaskValidationError {
    /// Stable code for log lines; never includes user input.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyText => "empty_text",
            Self::EmptyId => "empty_id",
            Self::InvalidDatetime(_) => "invalid_datetime",
        }
    }
}

impl Error for TaskValidationError {}

/// One entry of the task collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    /// Optional due instant. Serialized as an ISO-8601 string or `null`.
    #[serde(default)]
    pub datetime: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates an open task with trimmed text.
    ///
    /// # Errors
    /// - `EmptyText` when `text` is empty or whitespace-only.
    /// - `EmptyId` when `id` is empty.
    pub fn new(
        id: TaskId,
        text: &str,
        datetime: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TaskValidationError> {
        let text = normalize_text(text)?;
        let task = Self {
            id,
            text,
            datetime,
            completed: false,
            created_at,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks the stored-shape invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.text.trim().is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        Ok(())
    }

    pub fn has_due_date(&self) -> bool {
        self.datetime.is_some()
    }
}

/// Trims task text and rejects empty results.
pub fn normalize_text(text: &str) -> Result<String, TaskValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyText);
    }
    Ok(trimmed.to_string())
}
