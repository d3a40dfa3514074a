//! Sweep executor: runs registered sweep tasks.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use busway_core::error::AppError;

/// A periodic task acting on durable deadlines.
#[async_trait]
pub trait SweepTask: Send + Sync + std::fmt::Debug {
    /// Task name used in logs and summaries.
    fn name(&self) -> &str;

    /// Process everything due at `now`. Returns a JSON summary.
    async fn run(&self, now: DateTime<Utc>) -> Result<Value, TaskExecutionError>;
}

/// Error from a sweep run.
#[derive(Debug, thiserror::Error)]
pub enum TaskExecutionError {
    /// Failure that the next sweep may not hit, e.g. a lost connection.
    #[error("Transient task failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Outcome of one task within a sweep.
#[derive(Debug)]
pub struct TaskRun {
    /// Task name.
    pub task: String,
    /// Summary or error.
    pub result: Result<Value, TaskExecutionError>,
}

/// Runs registered sweep tasks in registration order.
#[derive(Debug, Default)]
pub struct SweepExecutor {
    tasks: Vec<Arc<dyn SweepTask>>,
}

impl SweepExecutor {
    /// Create an executor with no tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task.
    pub fn register(&mut self, task: Arc<dyn SweepTask>) {
        tracing::info!(task = task.name(), "Registered sweep task");
        self.tasks.push(task);
    }

    /// Names of registered tasks.
    pub fn registered(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.name().to_string()).collect()
    }

    /// Run every task once. A failing task does not stop the others.
    pub async fn run_all(&self, now: DateTime<Utc>) -> Vec<TaskRun> {
        let mut runs = Vec::with_capacity(self.tasks.len());
        for task in &self.tasks {
            let result = task.run(now).await;
            match &result {
                Ok(summary) => tracing::debug!(task = task.name(), %summary, "Sweep task finished"),
                Err(e) => tracing::error!(task = task.name(), error = %e, "Sweep task failed"),
            }
            runs.push(TaskRun {
                task: task.name().to_string(),
                result,
            });
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug)]
    struct Flaky {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SweepTask for Flaky {
        fn name(&self) -> &str {
            if self.fail { "flaky" } else { "steady" }
        }

        async fn run(&self, _now: DateTime<Utc>) -> Result<Value, TaskExecutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(TaskExecutionError::Transient("connection reset".into()))
            } else {
                Ok(serde_json::json!({ "processed": 0 }))
            }
        }
    }

    #[tokio::test]
    async fn failing_task_does_not_stop_the_rest() {
        let flaky = Arc::new(Flaky {
            fail: true,
            calls: AtomicUsize::new(0),
        });
        let steady = Arc::new(Flaky {
            fail: false,
            calls: AtomicUsize::new(0),
        });
        let mut executor = SweepExecutor::new();
        executor.register(flaky.clone());
        executor.register(steady.clone());

        let runs = executor.run_all(Utc::now()).await;

        assert_eq!(executor.registered(), vec!["flaky", "steady"]);
        assert!(runs[0].result.is_err());
        assert!(runs[1].result.is_ok());
        assert_eq!(steady.calls.load(Ordering::SeqCst), 1);
    }
}
