//! Notification dispatch, delivery transports and the user-facing inbox.

pub mod channel;
pub mod dispatcher;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use channel::{DeliveryReport, DeliveryTransport};
pub use dispatcher::{NotificationDispatcher, RetryPolicy, RetrySweepReport};
pub use service::NotificationService;
pub use store::{
    NotificationInbox, NotificationStore, PreferenceStore, Recipient, RecipientDirectory,
};
