//! Worker runner: wakes every poll interval and runs the sweeps.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use busway_core::config::WorkerConfig;

use crate::executor::SweepExecutor;

/// Periodic sweep loop.
#[derive(Debug)]
pub struct WorkerRunner {
    executor: Arc<SweepExecutor>,
    config: WorkerConfig,
}

impl WorkerRunner {
    /// Create a new worker runner.
    pub fn new(executor: Arc<SweepExecutor>, config: WorkerConfig) -> Self {
        Self { executor, config }
    }

    /// Run sweeps until the cancel signal flips to `true`.
    ///
    /// The first sweep runs immediately so deadlines that passed while the
    /// process was down are handled on startup.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        let period = Duration::from_secs(self.config.poll_interval_seconds.max(1));
        tracing::info!(
            poll_interval_seconds = period.as_secs(),
            tasks = ?self.executor.registered(),
            "Worker started"
        );

        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        tracing::info!("Worker received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.executor.run_all(Utc::now()).await;
                }
            }
        }

        tracing::info!("Worker shut down complete");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use serde_json::Value;

    use super::*;
    use crate::executor::{SweepTask, TaskExecutionError};

    #[derive(Debug, Default)]
    struct Counting(AtomicUsize);

    #[async_trait]
    impl SweepTask for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn run(&self, _now: DateTime<Utc>) -> Result<Value, TaskExecutionError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Value::Null)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sweeps_on_every_tick_until_cancelled() {
        let task = Arc::new(Counting::default());
        let mut executor = SweepExecutor::new();
        executor.register(task.clone());
        let runner = WorkerRunner::new(
            Arc::new(executor),
            WorkerConfig {
                poll_interval_seconds: 10,
                ..WorkerConfig::default()
            },
        );
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(rx).await });

        time::sleep(Duration::from_secs(25)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(task.0.load(Ordering::SeqCst), 3);
    }
}
