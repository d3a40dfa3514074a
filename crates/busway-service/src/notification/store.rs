//! Storage seams used by the dispatcher and the inbox, with their
//! PostgreSQL implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use busway_core::result::AppResult;
use busway_core::types::pagination::{PageRequest, PageResponse};
use busway_database::repositories::{NotificationRepository, PreferenceRepository, UserRepository};
use busway_entity::notification::{DeliveryChannel, Notification, NotificationPreference};

/// Where notification records live.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a new record.
    async fn insert(&self, notification: &Notification) -> AppResult<Notification>;
    /// Overwrite delivery state of an existing record.
    async fn update_delivery(&self, notification: &Notification) -> AppResult<()>;
    /// Claim due retries under a lease ending at `lease_until`.
    ///
    /// Claimed records come back already persisted as `Retrying` with their
    /// count advanced, see [`Notification::claim_retry`].
    async fn claim_due_retries(
        &self,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Notification>>;
}

/// A user's view of their notifications.
#[async_trait]
pub trait NotificationInbox: Send + Sync {
    /// Page through a user's notifications, newest first.
    async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>>;
    /// Number of unread notifications.
    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64>;
    /// A notification, only if it belongs to `user_id`.
    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Notification>>;
    /// Persist the read state of a notification.
    async fn save_read(&self, notification: &Notification) -> AppResult<Notification>;
    /// Mark every unread notification of a user as read.
    async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Read access to notification preferences.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// The stored preference record, if the user has one.
    async fn find(&self, user_id: Uuid) -> AppResult<Option<NotificationPreference>>;
    /// Insert or replace a preference record.
    async fn upsert(&self, prefs: &NotificationPreference) -> AppResult<NotificationPreference>;
}

/// Contact details of a notification recipient.
#[derive(Debug, Clone)]
pub struct Recipient {
    /// User ID.
    pub user_id: Uuid,
    /// Email address.
    pub email: String,
    /// Push device token.
    pub push_token: Option<String>,
    /// Preferred language.
    pub language: String,
}

impl Recipient {
    /// Channel-specific address; `None` when the channel cannot reach the user.
    pub fn address(&self, channel: DeliveryChannel) -> Option<&str> {
        match channel {
            DeliveryChannel::Email => Some(self.email.as_str()).filter(|e| !e.is_empty()),
            DeliveryChannel::Push => self.push_token.as_deref().filter(|t| !t.is_empty()),
        }
    }
}

/// Looks up recipients by user ID.
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// The recipient, or `None` when the user does not exist.
    async fn find_recipient(&self, user_id: Uuid) -> AppResult<Option<Recipient>>;
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn insert(&self, notification: &Notification) -> AppResult<Notification> {
        NotificationRepository::insert(self, notification).await
    }

    async fn update_delivery(&self, notification: &Notification) -> AppResult<()> {
        NotificationRepository::update_delivery(self, notification).await
    }

    async fn claim_due_retries(
        &self,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Notification>> {
        NotificationRepository::claim_due_retries(self, now, lease_until, limit).await
    }
}

#[async_trait]
impl NotificationInbox for NotificationRepository {
    async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.find_by_user(user_id, unread_only, page).await
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        NotificationRepository::count_unread(self, user_id).await
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Notification>> {
        NotificationRepository::find_owned(self, id, user_id).await
    }

    async fn save_read(&self, notification: &Notification) -> AppResult<Notification> {
        NotificationRepository::save_read(self, notification).await
    }

    async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        NotificationRepository::mark_all_read(self, user_id, now).await
    }
}

#[async_trait]
impl PreferenceStore for PreferenceRepository {
    async fn find(&self, user_id: Uuid) -> AppResult<Option<NotificationPreference>> {
        PreferenceRepository::find(self, user_id).await
    }

    async fn upsert(&self, prefs: &NotificationPreference) -> AppResult<NotificationPreference> {
        PreferenceRepository::upsert(self, prefs).await
    }
}

#[async_trait]
impl RecipientDirectory for UserRepository {
    async fn find_recipient(&self, user_id: Uuid) -> AppResult<Option<Recipient>> {
        Ok(self.find_by_id(user_id).await?.map(|user| Recipient {
            user_id: user.id,
            email: user.email,
            push_token: user.push_token,
            language: user.language,
        }))
    }
}
