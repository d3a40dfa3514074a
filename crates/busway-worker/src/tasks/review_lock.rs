//! Locks reviews whose 24-hour edit window has closed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use busway_service::ReviewService;

use crate::executor::{SweepTask, TaskExecutionError};

/// Clears `can_edit` on expired reviews. Edits are already refused past
/// `editable_until`; this keeps the stored flag in line with it.
#[derive(Debug)]
pub struct ReviewLockSweep {
    reviews: Arc<ReviewService>,
    batch_size: i64,
}

impl ReviewLockSweep {
    /// Create the sweep.
    pub fn new(reviews: Arc<ReviewService>, batch_size: i64) -> Self {
        Self {
            reviews,
            batch_size,
        }
    }
}

#[async_trait]
impl SweepTask for ReviewLockSweep {
    fn name(&self) -> &str {
        "review_lock"
    }

    async fn run(&self, now: DateTime<Utc>) -> Result<Value, TaskExecutionError> {
        let locked = self
            .reviews
            .lock_expired(now, self.batch_size)
            .await
            .map_err(|e| TaskExecutionError::Transient(format!("Review lock sweep failed: {e}")))?;

        if locked > 0 {
            tracing::info!(locked, "Locked reviews past their edit window");
        }

        Ok(serde_json::json!({
            "task": self.name(),
            "locked": locked,
        }))
    }
}
