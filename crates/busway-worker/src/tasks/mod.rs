//! Built-in sweep tasks.

pub mod notification_retry;
pub mod review_lock;

pub use notification_retry::NotificationRetrySweep;
pub use review_lock::ReviewLockSweep;
