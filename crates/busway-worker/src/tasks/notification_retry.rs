//! Retries failed notifications whose retry deadline has passed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use busway_service::NotificationDispatcher;

use crate::executor::{SweepTask, TaskExecutionError};

/// Claims due retries in batches and re-dispatches them.
#[derive(Debug)]
pub struct NotificationRetrySweep {
    dispatcher: Arc<NotificationDispatcher>,
    batch_size: i64,
}

impl NotificationRetrySweep {
    /// Create the sweep.
    pub fn new(dispatcher: Arc<NotificationDispatcher>, batch_size: i64) -> Self {
        Self {
            dispatcher,
            batch_size,
        }
    }
}

#[async_trait]
impl SweepTask for NotificationRetrySweep {
    fn name(&self) -> &str {
        "notification_retry"
    }

    async fn run(&self, now: DateTime<Utc>) -> Result<Value, TaskExecutionError> {
        let report = self
            .dispatcher
            .retry_due(now, self.batch_size)
            .await
            .map_err(|e| TaskExecutionError::Transient(format!("Retry sweep failed: {e}")))?;

        if report.claimed > 0 {
            tracing::info!(
                claimed = report.claimed,
                sent = report.sent,
                rescheduled = report.rescheduled,
                exhausted = report.exhausted,
                errors = report.errors,
                "Notification retry sweep finished"
            );
        }

        Ok(serde_json::json!({
            "task": self.name(),
            "claimed": report.claimed,
            "sent": report.sent,
            "rescheduled": report.rescheduled,
            "exhausted": report.exhausted,
            "errors": report.errors,
        }))
    }
}
