//! Scheduler background loop.
//!
//! Runs one scan cycle, then sleeps for the poll interval, until the
//! cancellation token fires. Cycles can also be driven one at a time through
//! [`ReminderScheduler::run_cycle`].

use crate::config::ReminderSettings;
use crate::model::task::Task;
use crate::scheduler::clock::{Clock, SystemClock};
use crate::scheduler::sink::ReminderSink;
use crate::store::task_store::TaskStore;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Outcome counters for one scan cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Tasks returned by the due scan.
    pub due: usize,
    /// Reminders the sink accepted.
    pub delivered: usize,
    /// Reminders the sink rejected.
    pub failed: usize,
    /// Tasks whose reminded flag was persisted.
    pub marked: usize,
    /// The due scan failed and the cycle did nothing.
    pub skipped: bool,
}

/// Builds the plain-text reminder for one task.
pub fn reminder_text(task: &Task) -> String {
    format!(
        "Reminder! Task: {}\nDeadline: {}",
        task.description,
        task.formatted_deadline()
    )
}

/// Background scheduler that reminds owners of tasks due soon.
pub struct ReminderScheduler {
    store: Arc<dyn TaskStore>,
    sink: Arc<dyn ReminderSink>,
    clock: Arc<dyn Clock>,
    settings: ReminderSettings,
}

impl ReminderScheduler {
    /// Creates a scheduler reading the local wall clock.
    pub fn new(
        store: Arc<dyn TaskStore>,
        sink: Arc<dyn ReminderSink>,
        settings: ReminderSettings,
    ) -> Self {
        Self {
            store,
            sink,
            clock: Arc::new(SystemClock),
            settings,
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Executes one scan: query due tasks, notify, mark.
    pub async fn run_cycle(&self) -> CycleReport {
        let now = self.clock.now();
        let mut report = CycleReport::default();

        let due = match self.store.due_for_reminder(now, self.settings.window_delta()) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(
                    "event=reminder_scan module=scheduler status=skipped now={} error={}",
                    now, err
                );
                report.skipped = true;
                return report;
            }
        };
        report.due = due.len();

        for task in &due {
            match self
                .sink
                .send_reminder(task.owner_id, &reminder_text(task))
                .await
            {
                Ok(()) => {
                    report.delivered += 1;
                    debug!(
                        "event=reminder_send module=scheduler status=ok task_id={} owner_id={}",
                        task.id, task.owner_id
                    );
                }
                Err(err) => {
                    report.failed += 1;
                    warn!(
                        "event=reminder_send module=scheduler status=error task_id={} owner_id={} error={}",
                        task.id, task.owner_id, err
                    );
                }
            }

            // Marked regardless of the delivery outcome.
            match self.store.mark_reminded(task.id) {
                Ok(true) => report.marked += 1,
                Ok(false) => debug!(
                    "event=reminder_mark module=scheduler status=gone task_id={}",
                    task.id
                ),
                Err(err) => error!(
                    "event=reminder_mark module=scheduler status=error task_id={} error={}",
                    task.id, err
                ),
            }
        }

        if report.due > 0 {
            info!(
                "event=reminder_cycle module=scheduler status=ok due={} delivered={} failed={} marked={}",
                report.due, report.delivered, report.failed, report.marked
            );
        }
        report
    }

    /// Runs cycles until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            "event=scheduler_start module=scheduler status=ok window_secs={} poll_interval_secs={}",
            self.settings.window().as_secs(),
            self.settings.poll_interval().as_secs()
        );

        loop {
            if cancel.is_cancelled() {
                break;
            }
            self.run_cycle().await;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.poll_interval()) => {}
            }
        }

        info!("event=scheduler_stop module=scheduler status=ok");
    }

    /// Spawns [`Self::run`] on the current tokio runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn reminder_text_contains_description_and_deadline() {
        let task = Task {
            id: 1,
            owner_id: 42,
            description: "Buy milk".to_string(),
            deadline: NaiveDate::from_ymd_opt(2025, 9, 20)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap(),
            reminded: false,
        };

        assert_eq!(
            reminder_text(&task),
            "Reminder! Task: Buy milk\nDeadline: 2025-09-20 18:00"
        );
    }
}
