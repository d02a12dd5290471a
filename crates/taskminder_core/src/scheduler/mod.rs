//! Deadline reminder scheduler.
//!
//! # Responsibility
//! - Periodically scan the task store for tasks whose deadline is inside the
//!   reminder window.
//! - Deliver one reminder per task through a [`ReminderSink`] and record it.
//!
//! # Invariants
//! - A task is marked reminded after a delivery attempt, whatever the outcome.
//! - A failed scan skips the whole cycle; nothing is marked.
//! - The loop only stops when its cancellation token fires.

pub mod clock;
pub mod runner;
pub mod sink;

pub use clock::{Clock, ManualClock, SystemClock};
pub use runner::{reminder_text, CycleReport, ReminderScheduler};
pub use sink::{NotifyError, ReminderSink};
