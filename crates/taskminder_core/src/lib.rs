//! Core domain logic for Taskminder.
//! Owner-scoped task storage, deadline reminders and request dispatch.

pub mod config;
pub mod db;
pub mod dispatcher;
pub mod logging;
pub mod model;
pub mod scheduler;
pub mod store;

pub use config::{AppConfig, ConfigError, ReminderSettings};
pub use dispatcher::task_dispatcher::{Reply, Request, TaskDispatcher, HELP_TEXT};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{
    format_deadline, parse_deadline, parse_task_id, OwnerId, Task, TaskId, TaskValidationError,
    DEADLINE_FORMAT,
};
pub use scheduler::{
    reminder_text, Clock, CycleReport, ManualClock, NotifyError, ReminderScheduler, ReminderSink,
    SystemClock,
};
pub use store::task_store::{SqliteTaskStore, StoreError, StoreResult, TaskStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
