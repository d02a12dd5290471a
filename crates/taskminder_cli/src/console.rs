//! Stdout-backed chat channel.

use async_trait::async_trait;
use std::sync::Arc;
use taskminder_core::{NotifyError, OwnerId, ReminderSink};
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

/// Shared line writer; replies and reminders never interleave mid-line.
#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<Stdout>>,
}

impl Console {
    pub fn stdout() -> Self {
        Self {
            out: Arc::new(Mutex::new(tokio::io::stdout())),
        }
    }

    pub async fn write_line(&self, text: &str) -> std::io::Result<()> {
        let mut out = self.out.lock().await;
        out.write_all(text.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await
    }
}

/// Prints reminders, tagged with the owner they are addressed to.
pub struct ConsoleSink {
    console: Console,
}

impl ConsoleSink {
    pub fn new(console: Console) -> Self {
        Self { console }
    }
}

#[async_trait]
impl ReminderSink for ConsoleSink {
    async fn send_reminder(&self, owner_id: OwnerId, text: &str) -> Result<(), NotifyError> {
        self.console
            .write_line(&format!("[to {owner_id}] {text}"))
            .await
            .map_err(|err| NotifyError::new(err.to_string()))
    }
}
