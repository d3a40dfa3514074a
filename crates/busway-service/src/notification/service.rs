//! Notification inbox and preference management.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use busway_core::error::AppError;
use busway_core::types::pagination::{PageRequest, PageResponse};
use busway_entity::notification::{Notification, NotificationPreference, PreferencePatch};

use super::store::{NotificationInbox, PreferenceStore};
use crate::context::RequestContext;

/// Manages a user's notifications and delivery preferences.
#[derive(Clone)]
pub struct NotificationService {
    inbox: Arc<dyn NotificationInbox>,
    preferences: Arc<dyn PreferenceStore>,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService").finish_non_exhaustive()
    }
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(inbox: Arc<dyn NotificationInbox>, preferences: Arc<dyn PreferenceStore>) -> Self {
        Self { inbox, preferences }
    }

    /// Lists notifications for the current user, newest first.
    pub async fn list_notifications(
        &self,
        ctx: &RequestContext,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<PageResponse<Notification>, AppError> {
        self.inbox.list(ctx.user_id, unread_only, &page).await
    }

    /// Gets the unread notification count.
    pub async fn unread_count(&self, ctx: &RequestContext) -> Result<i64, AppError> {
        self.inbox.count_unread(ctx.user_id).await
    }

    /// Marks a notification as read. Marking twice keeps the first `read_at`.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        notification_id: Uuid,
    ) -> Result<Notification, AppError> {
        let mut notification = self
            .inbox
            .find_owned(notification_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))?;

        if !notification.mark_read(Utc::now()) {
            return Ok(notification);
        }
        self.inbox.save_read(&notification).await
    }

    /// Marks all notifications as read for the current user.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        let updated = self.inbox.mark_all_read(ctx.user_id, Utc::now()).await?;
        info!(user_id = %ctx.user_id, updated, "Marked all notifications read");
        Ok(updated)
    }

    /// Gets the user's preferences, creating the default record on first access.
    pub async fn get_preferences(
        &self,
        ctx: &RequestContext,
    ) -> Result<NotificationPreference, AppError> {
        match self.preferences.find(ctx.user_id).await? {
            Some(prefs) => Ok(prefs),
            None => {
                self.preferences
                    .upsert(&NotificationPreference::defaults_for(ctx.user_id))
                    .await
            }
        }
    }

    /// Applies a partial preference update.
    pub async fn update_preferences(
        &self,
        ctx: &RequestContext,
        patch: PreferencePatch,
    ) -> Result<NotificationPreference, AppError> {
        let mut prefs = self.get_preferences(ctx).await?;
        prefs.apply(&patch);
        let saved = self.preferences.upsert(&prefs).await?;
        info!(user_id = %ctx.user_id, "Notification preferences updated");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use busway_core::error::ErrorKind;
    use busway_entity::notification::{
        ChannelTogglePatch, DeliveryChannel, NewNotification, NotificationType, PreferenceGroup,
    };
    use busway_entity::user::UserRole;

    use super::*;
    use crate::notification::testing::{MemoryNotifications, MemoryPreferences};

    struct Fixture {
        service: NotificationService,
        notifications: Arc<MemoryNotifications>,
        preferences: Arc<MemoryPreferences>,
    }

    fn fixture() -> Fixture {
        let notifications = Arc::new(MemoryNotifications::default());
        let preferences = Arc::new(MemoryPreferences::default());
        Fixture {
            service: NotificationService::new(notifications.clone(), preferences.clone()),
            notifications,
            preferences,
        }
    }

    fn ctx(user_id: Uuid) -> RequestContext {
        RequestContext {
            user_id,
            role: UserRole::User,
            name: "Rider".into(),
            is_verified: true,
            request_time: Utc::now(),
        }
    }

    fn seeded(f: &Fixture, user_id: Uuid) -> Uuid {
        let n = Notification::from_new(
            NewNotification {
                user_id,
                notification_type: NotificationType::JourneyReminder,
                title: "Departure soon".into(),
                message: "Your bus leaves in 30 minutes".into(),
                channels: vec![DeliveryChannel::Email],
                related_id: None,
                related_type: None,
                translations: None,
            },
            vec![DeliveryChannel::Email],
            Utc::now(),
        );
        let id = n.id;
        f.notifications.seed(n);
        id
    }

    #[tokio::test]
    async fn marking_read_twice_keeps_first_timestamp() {
        let f = fixture();
        let user = Uuid::new_v4();
        let id = seeded(&f, user);

        let first = f.service.mark_read(&ctx(user), id).await.unwrap();
        let second = f.service.mark_read(&ctx(user), id).await.unwrap();

        assert!(first.is_read);
        assert!(first.read_at.is_some());
        assert_eq!(second.read_at, first.read_at);
        assert_eq!(f.notifications.get(id).unwrap().read_at, first.read_at);
        assert_eq!(f.service.unread_count(&ctx(user)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn cannot_mark_someone_elses_notification() {
        let f = fixture();
        let owner = Uuid::new_v4();
        let id = seeded(&f, owner);

        let err = f
            .service
            .mark_read(&ctx(Uuid::new_v4()), id)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::NotFound);
        assert!(!f.notifications.get(id).unwrap().is_read);
    }

    #[tokio::test]
    async fn mark_all_read_touches_only_unread_of_the_user() {
        let f = fixture();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let read = seeded(&f, user);
        seeded(&f, user);
        seeded(&f, other);
        let earlier = f.service.mark_read(&ctx(user), read).await.unwrap();

        let updated = f.service.mark_all_read(&ctx(user)).await.unwrap();

        assert_eq!(updated, 1);
        assert_eq!(f.notifications.get(read).unwrap().read_at, earlier.read_at);
        assert_eq!(f.service.unread_count(&ctx(user)).await.unwrap(), 0);
        assert_eq!(f.service.unread_count(&ctx(other)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unread_filter_and_paging() {
        let f = fixture();
        let user = Uuid::new_v4();
        let read = seeded(&f, user);
        seeded(&f, user);
        seeded(&f, user);
        f.service.mark_read(&ctx(user), read).await.unwrap();

        let unread = f
            .service
            .list_notifications(&ctx(user), true, PageRequest::default())
            .await
            .unwrap();
        let page = f
            .service
            .list_notifications(&ctx(user), false, PageRequest::new(2, 2))
            .await
            .unwrap();

        assert_eq!(unread.total, 2);
        assert!(unread.items.iter().all(|n| !n.is_read));
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn reading_preferences_creates_defaults() {
        let f = fixture();
        let user = Uuid::new_v4();

        let prefs = f.service.get_preferences(&ctx(user)).await.unwrap();

        assert!(prefs.email_enabled && prefs.push_enabled);
        assert!(!prefs.allows(NotificationType::Promotion, DeliveryChannel::Email));
        assert!(f.preferences.find(user).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn preference_update_is_partial() {
        let f = fixture();
        let user = Uuid::new_v4();

        let prefs = f
            .service
            .update_preferences(
                &ctx(user),
                PreferencePatch {
                    categories: vec![(
                        PreferenceGroup::Promotion,
                        ChannelTogglePatch {
                            email: Some(true),
                            push: None,
                        },
                    )],
                    ..PreferencePatch::default()
                },
            )
            .await
            .unwrap();

        assert!(prefs.allows(NotificationType::Promotion, DeliveryChannel::Email));
        assert!(!prefs.allows(NotificationType::Promotion, DeliveryChannel::Push));
        assert!(prefs.allows(NotificationType::Cancellation, DeliveryChannel::Push));
    }
}
