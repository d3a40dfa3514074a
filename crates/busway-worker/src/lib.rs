//! Background sweeps for Busway.
//!
//! This crate provides:
//! - A worker runner that wakes on a fixed interval until shut down
//! - A task registry that runs every registered sweep in turn
//! - The notification retry sweep and the review edit-lock sweep
//!
//! Both sweeps act on deadlines stored in the database, so work scheduled
//! before a restart is picked up by the next sweep.

pub mod executor;
pub mod runner;
pub mod tasks;

pub use executor::{SweepExecutor, SweepTask, TaskExecutionError};
pub use runner::WorkerRunner;
pub use tasks::{NotificationRetrySweep, ReviewLockSweep};
