//! Notification domain entities.

pub mod category;
pub mod channel;
pub mod model;
pub mod preference;

pub use category::{NotificationType, PreferenceGroup};
pub use channel::DeliveryChannel;
pub use model::{
    LocalizedText, NewNotification, Notification, NotificationStatus, RelatedEntity,
};
pub use preference::{
    CategoryPreferences, ChannelToggle, ChannelTogglePatch, NotificationPreference,
    PreferencePatch,
};

/// Maximum number of retries after the first failed dispatch.
pub const MAX_RETRIES: i32 = 3;
