//! Request dispatcher over a shared task store.
//!
//! # Responsibility
//! - Validate raw request fields (description, deadline text, task id text).
//! - Delegate persistence to the [`TaskStore`] and translate outcomes.
//!
//! # Invariants
//! - Validation errors surface verbatim to the requester.
//! - Deleting a missing or foreign task is a `NotFound` reply, not a fault.
//! - Storage failures become `Unavailable` replies and are logged.

use crate::model::task::{parse_task_id, OwnerId, Task, TaskId, TaskValidationError};
use crate::store::task_store::{StoreError, TaskStore};
use log::{error, info, warn};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Help text shown for `/start` and `/help`.
pub const HELP_TEXT: &str = "Hi! I keep track of your tasks.\n\
Send a task as:\n<task description> ; <deadline YYYY-MM-DD HH:MM>\n\
Example: Buy bread ; 2025-09-20 18:00\n\n\
Commands:\n/tasks - list your tasks\n/done <id> - delete a task";

/// One inbound request, already split into fields by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CreateTask {
        owner_id: OwnerId,
        description: String,
        deadline: String,
    },
    ListTasks {
        owner_id: OwnerId,
    },
    DeleteTask {
        owner_id: OwnerId,
        id: String,
    },
    Help,
}

/// Outcome of one request, rendered to text through `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    TaskCreated(Task),
    TaskList(Vec<Task>),
    TaskDeleted(TaskId),
    Help,
    NotFound(TaskId),
    Invalid(TaskValidationError),
    Unavailable,
}

impl Reply {
    /// Whether this reply reports a failure to the requester.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Invalid(_) | Self::Unavailable
        )
    }
}

impl Display for Reply {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskCreated(task) => write!(
                f,
                "Task added! #{}: {} (due {})",
                task.id,
                task.description,
                task.formatted_deadline()
            ),
            Self::TaskList(tasks) if tasks.is_empty() => write!(f, "You have no tasks."),
            Self::TaskList(tasks) => {
                write!(f, "Your tasks:")?;
                for task in tasks {
                    write!(
                        f,
                        "\n{}. {} (due {})",
                        task.id,
                        task.description,
                        task.formatted_deadline()
                    )?;
                }
                Ok(())
            }
            Self::TaskDeleted(id) => write!(f, "Task #{id} deleted."),
            Self::Help => write!(f, "{HELP_TEXT}"),
            Self::NotFound(id) => write!(f, "Task #{id} not found."),
            Self::Invalid(err) => write!(f, "{err}"),
            Self::Unavailable => write!(
                f,
                "Task storage is temporarily unavailable. Please try again later."
            ),
        }
    }
}

/// Translates requests into store calls.
pub struct TaskDispatcher {
    store: Arc<dyn TaskStore>,
}

impl TaskDispatcher {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Handles one request. Never fails; errors become replies.
    pub fn dispatch(&self, request: Request) -> Reply {
        match request {
            Request::CreateTask {
                owner_id,
                description,
                deadline,
            } => self.create_task(owner_id, &description, &deadline),
            Request::ListTasks { owner_id } => self.list_tasks(owner_id),
            Request::DeleteTask { owner_id, id } => self.delete_task(owner_id, &id),
            Request::Help => Reply::Help,
        }
    }

    fn create_task(&self, owner_id: OwnerId, description: &str, deadline: &str) -> Reply {
        let id = match self.store.create_from_input(owner_id, description, deadline) {
            Ok(id) => id,
            Err(err) => return store_failure_reply("create", owner_id, err),
        };

        // Reply with the row as stored.
        match self.store.get(owner_id, id) {
            Ok(Some(task)) => {
                info!(
                    "event=task_created module=dispatcher status=ok task_id={id} owner_id={owner_id}"
                );
                Reply::TaskCreated(task)
            }
            Ok(None) => store_failure_reply(
                "create",
                owner_id,
                StoreError::InvalidData(format!("task {id} missing right after insert")),
            ),
            Err(err) => store_failure_reply("create", owner_id, err),
        }
    }

    fn list_tasks(&self, owner_id: OwnerId) -> Reply {
        match self.store.list(owner_id) {
            Ok(tasks) => Reply::TaskList(tasks),
            Err(err) => store_failure_reply("list", owner_id, err),
        }
    }

    fn delete_task(&self, owner_id: OwnerId, raw_id: &str) -> Reply {
        let id = match parse_task_id(raw_id) {
            Ok(id) => id,
            Err(err) => return Reply::Invalid(err),
        };

        match self.store.delete(owner_id, id) {
            Ok(true) => {
                info!(
                    "event=task_deleted module=dispatcher status=ok task_id={id} owner_id={owner_id}"
                );
                Reply::TaskDeleted(id)
            }
            Ok(false) => Reply::NotFound(id),
            Err(err) => store_failure_reply("delete", owner_id, err),
        }
    }
}

fn store_failure_reply(operation: &str, owner_id: OwnerId, err: StoreError) -> Reply {
    match err {
        StoreError::Validation(err) => Reply::Invalid(err),
        StoreError::Unavailable(_) => {
            warn!(
                "event=task_{operation} module=dispatcher status=unavailable owner_id={owner_id} error={err}"
            );
            Reply::Unavailable
        }
        StoreError::InvalidData(_) => {
            error!(
                "event=task_{operation} module=dispatcher status=error owner_id={owner_id} error={err}"
            );
            Reply::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: TaskId, description: &str, hour: u32) -> Task {
        Task {
            id,
            owner_id: 1,
            description: description.to_string(),
            deadline: NaiveDate::from_ymd_opt(2025, 9, 20)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            reminded: false,
        }
    }

    #[test]
    fn task_list_renders_one_line_per_task() {
        let reply = Reply::TaskList(vec![task(1, "Buy milk", 18), task(3, "Call mom", 20)]);
        assert_eq!(
            reply.to_string(),
            "Your tasks:\n1. Buy milk (due 2025-09-20 18:00)\n3. Call mom (due 2025-09-20 20:00)"
        );
    }

    #[test]
    fn empty_task_list_has_dedicated_message() {
        assert_eq!(Reply::TaskList(Vec::new()).to_string(), "You have no tasks.");
    }

    #[test]
    fn error_replies_are_flagged() {
        assert!(Reply::NotFound(1).is_error());
        assert!(Reply::Unavailable.is_error());
        assert!(Reply::Invalid(TaskValidationError::EmptyDescription).is_error());
        assert!(!Reply::TaskDeleted(1).is_error());
        assert!(!Reply::Help.is_error());
    }

    #[test]
    fn validation_reply_is_the_validation_message() {
        let err = TaskValidationError::InvalidDeadline("soon".to_string());
        assert_eq!(Reply::Invalid(err.clone()).to_string(), err.to_string());
    }
}
