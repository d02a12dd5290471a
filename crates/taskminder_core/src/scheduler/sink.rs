//! Outbound reminder delivery seam.

use crate::model::task::OwnerId;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Delivery failure reported by a [`ReminderSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyError {
    message: String,
}

impl NotifyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "reminder delivery failed: {}", self.message)
    }
}

impl Error for NotifyError {}

/// Transport that delivers plain-text reminders to an owner.
#[async_trait]
pub trait ReminderSink: Send + Sync {
    async fn send_reminder(&self, owner_id: OwnerId, text: &str) -> Result<(), NotifyError>;
}
