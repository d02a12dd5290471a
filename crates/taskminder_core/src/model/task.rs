//! Task domain model.
//!
//! # Responsibility
//! - Define the task record shared by the store, scheduler and dispatcher.
//! - Parse and format the `YYYY-MM-DD HH:MM` deadline wire format.
//! - Validate user-supplied fields before they reach persistence.
//!
//! # Invariants
//! - `description` is non-empty after trimming.
//! - `deadline` has zero seconds and nanoseconds.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned task identifier, monotonic within one database.
pub type TaskId = i64;

/// Opaque identifier of the user a task belongs to.
pub type OwnerId = i64;

/// Deadline format accepted from users and used in replies and reminders.
pub const DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Example deadline shown in user-facing hints.
pub const DEADLINE_EXAMPLE: &str = "2025-09-20 18:00";

/// One tracked task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub owner_id: OwnerId,
    pub description: String,
    pub deadline: NaiveDateTime,
    /// Set once by the reminder scheduler.
    pub reminded: bool,
}

impl Task {
    /// Deadline rendered in [`DEADLINE_FORMAT`].
    pub fn formatted_deadline(&self) -> String {
        format_deadline(self.deadline)
    }
}

/// Validation failures for user-supplied task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyDescription,
    InvalidDeadline(String),
    InvalidTaskId(String),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "task description cannot be empty"),
            Self::InvalidDeadline(value) => write!(
                f,
                "invalid deadline `{value}`; expected YYYY-MM-DD HH:MM, e.g. {DEADLINE_EXAMPLE}"
            ),
            Self::InvalidTaskId(value) => {
                write!(f, "invalid task id `{value}`; expected a positive number")
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Parses a user-supplied deadline in `YYYY-MM-DD HH:MM` form.
///
/// Surrounding whitespace is ignored. Past deadlines are accepted.
pub fn parse_deadline(value: &str) -> Result<NaiveDateTime, TaskValidationError> {
    let trimmed = value.trim();
    NaiveDateTime::parse_from_str(trimmed, DEADLINE_FORMAT)
        .map_err(|_| TaskValidationError::InvalidDeadline(trimmed.to_string()))
}

/// Formats a deadline in `YYYY-MM-DD HH:MM` form.
pub fn format_deadline(deadline: NaiveDateTime) -> String {
    deadline.format(DEADLINE_FORMAT).to_string()
}

/// Drops seconds and sub-second precision.
pub fn truncate_to_minute(value: NaiveDateTime) -> NaiveDateTime {
    value
        .with_second(0)
        .and_then(|value| value.with_nanosecond(0))
        .unwrap_or(value)
}

/// Returns the trimmed description, or an error when nothing is left.
pub fn normalize_description(value: &str) -> Result<String, TaskValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyDescription);
    }
    Ok(trimmed.to_string())
}

/// Parses a user-supplied task id such as the argument of a delete command.
pub fn parse_task_id(value: &str) -> Result<TaskId, TaskValidationError> {
    let trimmed = value.trim();
    match trimmed.parse::<TaskId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(TaskValidationError::InvalidTaskId(trimmed.to_string())),
    }
}
