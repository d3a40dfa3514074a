//! Notification dispatcher.
//!
//! Resolves preferences, attempts each permitted channel, records the
//! per-channel outcome and schedules bounded retries as durable deadlines
//! on the record itself. Retries are picked up by the worker sweep through
//! [`NotificationDispatcher::retry_due`], which claims them under a lease so
//! an interrupted sweep never strands a record.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use busway_core::config::{NotificationConfig, RetryScope};
use busway_core::error::AppError;
use busway_entity::notification::{
    DeliveryChannel, MAX_RETRIES, NewNotification, Notification, NotificationPreference,
    NotificationStatus, NotificationType,
};

use super::channel::DeliveryTransport;
use super::store::{NotificationStore, PreferenceStore, Recipient, RecipientDirectory};

/// Retry timing and scope.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Delay between a failed attempt and its retry.
    pub delay: Duration,
    /// Retries allowed per notification.
    pub max_retries: i32,
    /// Channels re-attempted on retry.
    pub scope: RetryScope,
    /// How long a claimed retry is held before it may be claimed again.
    pub lease: Duration,
}

impl RetryPolicy {
    /// Policy from configuration; the retry cap never exceeds [`MAX_RETRIES`].
    pub fn from_config(config: &NotificationConfig) -> Self {
        Self {
            delay: Duration::seconds(config.retry_delay_seconds as i64),
            max_retries: config.max_retries.clamp(0, MAX_RETRIES),
            scope: config.retry_scope,
            lease: Duration::seconds(config.retry_lease_seconds as i64),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&NotificationConfig::default())
    }
}

/// Counters from one retry sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetrySweepReport {
    /// Records claimed.
    pub claimed: usize,
    /// Records that ended as sent.
    pub sent: usize,
    /// Records that failed again and were rescheduled.
    pub rescheduled: usize,
    /// Records that reached a terminal failure.
    pub exhausted: usize,
    /// Records whose retry hit a storage error.
    pub errors: usize,
}

/// Delivers notifications over email and push according to user preferences.
pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    preferences: Arc<dyn PreferenceStore>,
    recipients: Arc<dyn RecipientDirectory>,
    email: Arc<dyn DeliveryTransport>,
    push: Arc<dyn DeliveryTransport>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("policy", &self.policy)
            .finish()
    }
}

impl NotificationDispatcher {
    /// Creates a new dispatcher.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        preferences: Arc<dyn PreferenceStore>,
        recipients: Arc<dyn RecipientDirectory>,
        email: Arc<dyn DeliveryTransport>,
        push: Arc<dyn DeliveryTransport>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            store,
            preferences,
            recipients,
            email,
            push,
            policy,
        }
    }

    /// The active retry policy.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Create, deliver and persist a notification.
    ///
    /// Fails with `NotFound` for an unknown user. Delivery failures never
    /// fail the call; they are recorded on the returned record.
    pub async fn dispatch(&self, request: NewNotification) -> Result<Notification, AppError> {
        self.dispatch_at(request, Utc::now()).await
    }

    /// [`dispatch`](Self::dispatch) with an explicit clock.
    pub async fn dispatch_at(
        &self,
        request: NewNotification,
        now: DateTime<Utc>,
    ) -> Result<Notification, AppError> {
        let recipient = self
            .recipients
            .find_recipient(request.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        let prefs = self.preferences_for(&recipient).await?;
        let targets = permitted(
            &request.channels,
            request.notification_type,
            &prefs,
            &recipient,
        );

        let mut notification = self
            .store
            .insert(&Notification::from_new(request, targets.clone(), now))
            .await?;

        if targets.is_empty() {
            debug!(
                notification_id = %notification.id,
                user_id = %recipient.user_id,
                notification_type = %notification.notification_type,
                "No channel permitted, notification stored as pending"
            );
            return Ok(notification);
        }

        self.attempt(&mut notification, &recipient, &targets).await;
        let scheduled =
            notification.schedule_retry(now, self.policy.delay, self.policy.max_retries);
        self.store.update_delivery(&notification).await?;

        info!(
            notification_id = %notification.id,
            user_id = %recipient.user_id,
            notification_type = %notification.notification_type,
            status = ?notification.status,
            retry_scheduled = scheduled,
            "Notification dispatched"
        );
        Ok(notification)
    }

    /// Dispatch on a background task; errors are logged, not returned.
    pub fn dispatch_detached(self: &Arc<Self>, request: NewNotification) {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            let user_id = request.user_id;
            let notification_type = request.notification_type;
            if let Err(e) = dispatcher.dispatch(request).await {
                error!(%user_id, %notification_type, error = %e, "Background dispatch failed");
            }
        });
    }

    /// Deliver one retry the store has already claimed.
    ///
    /// Any error leaves the record `retrying` under its lease, so a later
    /// sweep resumes it.
    async fn retry(
        &self,
        mut notification: Notification,
        now: DateTime<Utc>,
    ) -> Result<Notification, AppError> {
        let Some(recipient) = self.recipients.find_recipient(notification.user_id).await? else {
            notification.abandon_retry(now);
            self.store.update_delivery(&notification).await?;
            warn!(notification_id = %notification.id, "Recipient vanished, retry abandoned");
            return Ok(notification);
        };
        let prefs = self.preferences_for(&recipient).await?;

        let candidates = notification.retry_channels(self.policy.scope);
        let targets = permitted(
            &candidates,
            notification.notification_type,
            &prefs,
            &recipient,
        );
        if targets.is_empty() {
            notification.abandon_retry(now);
            self.store.update_delivery(&notification).await?;
            info!(
                notification_id = %notification.id,
                "No channel permitted on retry, notification left failed"
            );
            return Ok(notification);
        }

        self.attempt(&mut notification, &recipient, &targets).await;
        let scheduled =
            notification.schedule_retry(now, self.policy.delay, self.policy.max_retries);
        self.store.update_delivery(&notification).await?;

        if !scheduled && notification.status == NotificationStatus::Failed {
            warn!(
                notification_id = %notification.id,
                retry_count = notification.retry_count,
                "Notification retries exhausted"
            );
        }
        Ok(notification)
    }

    /// Retry every failed notification whose deadline has passed, and resume
    /// retries whose lease expired.
    pub async fn retry_due(
        &self,
        now: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<RetrySweepReport, AppError> {
        let claimed = self
            .store
            .claim_due_retries(now, now + self.policy.lease, batch_size)
            .await?;
        let mut report = RetrySweepReport {
            claimed: claimed.len(),
            ..RetrySweepReport::default()
        };

        for notification in claimed {
            let id = notification.id;
            match self.retry(notification, now).await {
                Ok(n) if n.status == NotificationStatus::Sent => report.sent += 1,
                Ok(n) if n.is_terminal() => report.exhausted += 1,
                Ok(_) => report.rescheduled += 1,
                Err(e) => {
                    report.errors += 1;
                    error!(notification_id = %id, error = %e, "Notification retry failed");
                }
            }
        }
        Ok(report)
    }

    async fn preferences_for(
        &self,
        recipient: &Recipient,
    ) -> Result<NotificationPreference, AppError> {
        Ok(self
            .preferences
            .find(recipient.user_id)
            .await?
            .unwrap_or_else(|| NotificationPreference::defaults_for(recipient.user_id)))
    }

    async fn attempt(
        &self,
        notification: &mut Notification,
        recipient: &Recipient,
        targets: &[DeliveryChannel],
    ) {
        let (title, body) = localized(notification, &recipient.language);
        for &channel in targets {
            let Some(address) = recipient.address(channel) else {
                continue;
            };
            let report = self.transport(channel).send(address, &title, &body).await;
            notification.record_delivery(channel, report.into_error());
        }
    }

    fn transport(&self, channel: DeliveryChannel) -> &dyn DeliveryTransport {
        match channel {
            DeliveryChannel::Email => self.email.as_ref(),
            DeliveryChannel::Push => self.push.as_ref(),
        }
    }
}

/// Channels from `requested` that preferences and contact details allow.
fn permitted(
    requested: &[DeliveryChannel],
    notification_type: NotificationType,
    prefs: &NotificationPreference,
    recipient: &Recipient,
) -> Vec<DeliveryChannel> {
    DeliveryChannel::normalize(requested)
        .into_iter()
        .filter(|ch| prefs.allows(notification_type, *ch))
        .filter(|ch| recipient.address(*ch).is_some())
        .collect()
}

/// Title and body in the recipient's language when a translation exists.
fn localized(notification: &Notification, language: &str) -> (String, String) {
    notification
        .translations
        .as_ref()
        .and_then(|t| t.get(language))
        .map(|text| (text.title.clone(), text.message.clone()))
        .unwrap_or_else(|| (notification.title.clone(), notification.message.clone()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use busway_core::error::ErrorKind;
    use busway_entity::notification::{
        ChannelTogglePatch, LocalizedText, PreferenceGroup, PreferencePatch, RelatedEntity,
    };
    use uuid::Uuid;

    use super::*;
    use crate::notification::channel::DeliveryReport;
    use crate::notification::testing::Harness;

    const BOTH: [DeliveryChannel; 2] = [DeliveryChannel::Email, DeliveryChannel::Push];

    fn policy(scope: RetryScope) -> RetryPolicy {
        RetryPolicy {
            delay: Duration::seconds(60),
            max_retries: 3,
            scope,
            lease: Duration::minutes(5),
        }
    }

    fn request(user_id: Uuid, notification_type: NotificationType) -> NewNotification {
        NewNotification {
            user_id,
            notification_type,
            title: "Trip booked".into(),
            message: "Your seat is confirmed".into(),
            channels: BOTH.to_vec(),
            related_id: Some(Uuid::new_v4()),
            related_type: Some(RelatedEntity::Booking),
            translations: None,
        }
    }

    #[tokio::test]
    async fn delivers_on_every_permitted_channel() {
        let h = Harness::new(policy(RetryScope::FailedOnly));
        let user = h.user();

        let n = h
            .dispatcher
            .dispatch(request(user, NotificationType::BookingConfirmation))
            .await
            .unwrap();

        assert_eq!(n.status, NotificationStatus::Sent);
        assert!(n.email_sent && n.push_sent);
        assert!(n.next_attempt_at.is_none());
        assert_eq!(h.email.calls().len(), 1);
        assert_eq!(h.push.calls().len(), 1);
        assert_eq!(h.notifications.get(n.id).unwrap().status, NotificationStatus::Sent);
    }

    #[tokio::test]
    async fn promotion_is_stored_pending_under_defaults() {
        let h = Harness::new(policy(RetryScope::FailedOnly));
        let user = h.user();

        let n = h
            .dispatcher
            .dispatch(request(user, NotificationType::Promotion))
            .await
            .unwrap();

        assert_eq!(n.status, NotificationStatus::Pending);
        assert!(!n.email_sent && !n.push_sent);
        assert!(n.channels.is_empty());
        assert!(h.email.calls().is_empty());
        assert!(h.push.calls().is_empty());
        assert_eq!(h.notifications.len(), 1);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found_and_nothing_is_stored() {
        let h = Harness::new(policy(RetryScope::FailedOnly));

        let err = h
            .dispatcher
            .dispatch(request(Uuid::new_v4(), NotificationType::Cancellation))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(h.notifications.len(), 0);
    }

    #[tokio::test]
    async fn partial_failure_schedules_a_retry() {
        let h = Harness::new(policy(RetryScope::FailedOnly));
        let user = h.user();
        h.push.then(DeliveryReport::failed("gateway timeout"));
        let now = Utc::now();

        let n = h
            .dispatcher
            .dispatch_at(request(user, NotificationType::ScheduleChange), now)
            .await
            .unwrap();

        assert_eq!(n.status, NotificationStatus::Failed);
        assert!(n.email_sent);
        assert!(!n.push_sent);
        assert_eq!(n.push_error.as_deref(), Some("gateway timeout"));
        assert_eq!(n.retry_count, 0);
        assert_eq!(n.next_attempt_at, Some(now + Duration::seconds(60)));
    }

    #[tokio::test]
    async fn failed_only_retry_skips_delivered_channels() {
        let h = Harness::new(policy(RetryScope::FailedOnly));
        let user = h.user();
        h.push.then(DeliveryReport::failed("gateway timeout"));
        let now = Utc::now();
        let n = h
            .dispatcher
            .dispatch_at(request(user, NotificationType::ScheduleChange), now)
            .await
            .unwrap();

        let report = h
            .dispatcher
            .retry_due(now + Duration::seconds(61), 100)
            .await
            .unwrap();

        assert_eq!(report.claimed, 1);
        assert_eq!(report.sent, 1);
        assert_eq!(h.email.calls().len(), 1);
        assert_eq!(h.push.calls().len(), 2);
        let stored = h.notifications.get(n.id).unwrap();
        assert_eq!(stored.status, NotificationStatus::Sent);
        assert_eq!(stored.retry_count, 1);
        assert!(stored.push_error.is_none());
    }

    #[tokio::test]
    async fn all_attempted_retry_resends_every_channel() {
        let h = Harness::new(policy(RetryScope::AllAttempted));
        let user = h.user();
        h.push.then(DeliveryReport::failed("gateway timeout"));
        let now = Utc::now();
        h.dispatcher
            .dispatch_at(request(user, NotificationType::ScheduleChange), now)
            .await
            .unwrap();

        h.dispatcher
            .retry_due(now + Duration::seconds(61), 100)
            .await
            .unwrap();

        assert_eq!(h.email.calls().len(), 2);
        assert_eq!(h.push.calls().len(), 2);
    }

    #[tokio::test]
    async fn all_attempted_retry_skips_channels_never_attempted() {
        let h = Harness::new(policy(RetryScope::AllAttempted));
        let user = h.user();
        let mut prefs = NotificationPreference::defaults_for(user);
        prefs.apply(&PreferencePatch {
            push_enabled: Some(false),
            ..PreferencePatch::default()
        });
        h.preferences.put(prefs);
        h.email.then(DeliveryReport::failed("smtp down"));
        let now = Utc::now();
        let n = h
            .dispatcher
            .dispatch_at(request(user, NotificationType::ScheduleChange), now)
            .await
            .unwrap();
        assert_eq!(n.channels, vec![DeliveryChannel::Email]);

        h.preferences.put(NotificationPreference::defaults_for(user));
        h.dispatcher
            .retry_due(now + Duration::seconds(61), 100)
            .await
            .unwrap();

        assert_eq!(h.email.calls().len(), 2);
        assert!(h.push.calls().is_empty());
    }

    #[tokio::test]
    async fn interrupted_retry_is_resumed_after_its_lease() {
        let h = Harness::new(policy(RetryScope::FailedOnly));
        let user = h.user();
        h.email.always(DeliveryReport::failed("smtp down"));
        let now = Utc::now();
        let n = h
            .dispatcher
            .dispatch_at(request(user, NotificationType::Cancellation), now)
            .await
            .unwrap();

        let claimed_at = now + Duration::seconds(61);
        let claimed = h
            .notifications
            .claim_due_retries(claimed_at, claimed_at + Duration::minutes(5), 100)
            .await
            .unwrap();
        assert_eq!(claimed.len(), 1);
        drop(claimed);

        let stored = h.notifications.get(n.id).unwrap();
        assert_eq!(stored.status, NotificationStatus::Retrying);
        assert_eq!(stored.retry_count, 1);
        assert!(!stored.is_terminal());

        let early = h
            .dispatcher
            .retry_due(claimed_at + Duration::minutes(1), 100)
            .await
            .unwrap();
        assert_eq!(early.claimed, 0);

        let later = now + Duration::hours(1);
        let report = h.dispatcher.retry_due(later, 100).await.unwrap();
        assert_eq!(report.claimed, 1);
        assert_eq!(report.rescheduled, 1);

        let stored = h.notifications.get(n.id).unwrap();
        assert_eq!(stored.retry_count, 1);
        assert_eq!(stored.status, NotificationStatus::Failed);
        assert_eq!(stored.next_attempt_at, Some(later + Duration::seconds(60)));
        assert_eq!(h.email.calls().len(), 2);
    }

    #[tokio::test]
    async fn retries_are_not_claimed_before_their_deadline() {
        let h = Harness::new(policy(RetryScope::FailedOnly));
        let user = h.user();
        h.email.always(DeliveryReport::failed("smtp down"));
        let now = Utc::now();
        h.dispatcher
            .dispatch_at(request(user, NotificationType::Cancellation), now)
            .await
            .unwrap();

        let report = h
            .dispatcher
            .retry_due(now + Duration::seconds(30), 100)
            .await
            .unwrap();

        assert_eq!(report, RetrySweepReport::default());
        assert_eq!(h.email.calls().len(), 1);
    }

    #[tokio::test]
    async fn retries_stop_after_the_cap() {
        let h = Harness::new(policy(RetryScope::FailedOnly));
        let user = h.user();
        h.email.always(DeliveryReport::failed("smtp down"));
        let mut now = Utc::now();
        let n = h
            .dispatcher
            .dispatch_at(request(user, NotificationType::Cancellation), now)
            .await
            .unwrap();

        let mut exhausted = 0;
        for _ in 0..5 {
            now += Duration::seconds(61);
            exhausted += h.dispatcher.retry_due(now, 100).await.unwrap().exhausted;
        }

        let stored = h.notifications.get(n.id).unwrap();
        assert_eq!(stored.retry_count, 3);
        assert_eq!(stored.status, NotificationStatus::Failed);
        assert!(stored.next_attempt_at.is_none());
        assert!(stored.is_terminal());
        assert_eq!(exhausted, 1);
        assert_eq!(h.email.calls().len(), 4);
    }

    #[tokio::test]
    async fn push_is_skipped_without_a_device_token() {
        let h = Harness::new(policy(RetryScope::FailedOnly));
        let user = h.user();
        h.directory.add(Recipient {
            user_id: user,
            email: "rider@example.com".into(),
            push_token: None,
            language: "en".into(),
        });

        let n = h
            .dispatcher
            .dispatch(request(user, NotificationType::JourneyReminder))
            .await
            .unwrap();

        assert_eq!(n.status, NotificationStatus::Sent);
        assert!(n.email_sent);
        assert!(!n.push_sent);
        assert!(n.push_error.is_none());
        assert_eq!(n.channels, vec![DeliveryChannel::Email]);
        assert!(h.push.calls().is_empty());
    }

    #[tokio::test]
    async fn retry_is_abandoned_when_the_channel_was_disabled() {
        let h = Harness::new(policy(RetryScope::FailedOnly));
        let user = h.user();
        h.push.then(DeliveryReport::failed("gateway timeout"));
        let now = Utc::now();
        let n = h
            .dispatcher
            .dispatch_at(request(user, NotificationType::PostLike), now)
            .await
            .unwrap();

        let mut prefs = NotificationPreference::defaults_for(user);
        prefs.apply(&PreferencePatch {
            categories: vec![(
                PreferenceGroup::Social,
                ChannelTogglePatch {
                    email: None,
                    push: Some(false),
                },
            )],
            ..PreferencePatch::default()
        });
        h.preferences.put(prefs);

        let report = h
            .dispatcher
            .retry_due(now + Duration::seconds(61), 100)
            .await
            .unwrap();

        assert_eq!(report.exhausted, 1);
        assert_eq!(h.push.calls().len(), 1);
        let stored = h.notifications.get(n.id).unwrap();
        assert_eq!(stored.status, NotificationStatus::Failed);
        assert_eq!(stored.retry_count, 1);
        assert!(stored.next_attempt_at.is_none());
    }

    #[tokio::test]
    async fn retry_is_abandoned_when_the_user_is_gone() {
        let h = Harness::new(policy(RetryScope::FailedOnly));
        let user = h.user();
        h.email.then(DeliveryReport::failed("smtp down"));
        let now = Utc::now();
        let n = h
            .dispatcher
            .dispatch_at(request(user, NotificationType::Cancellation), now)
            .await
            .unwrap();
        h.directory.remove(user);

        h.dispatcher
            .retry_due(now + Duration::seconds(61), 100)
            .await
            .unwrap();

        let stored = h.notifications.get(n.id).unwrap();
        assert_eq!(stored.status, NotificationStatus::Failed);
        assert!(stored.is_terminal());
    }

    #[tokio::test]
    async fn localized_text_follows_recipient_language() {
        let h = Harness::new(policy(RetryScope::FailedOnly));
        let user = h.user();
        h.directory.add(Recipient {
            user_id: user,
            email: "rider@example.com".into(),
            push_token: None,
            language: "vi".into(),
        });
        let mut translations = BTreeMap::new();
        translations.insert(
            "vi".to_string(),
            LocalizedText {
                title: "Da dat ve".into(),
                message: "Cho ngoi da duoc xac nhan".into(),
            },
        );
        let mut req = request(user, NotificationType::BookingConfirmation);
        req.translations = Some(translations);

        h.dispatcher.dispatch(req).await.unwrap();

        let calls = h.email.calls();
        assert_eq!(calls[0].1, "Da dat ve");
        assert_eq!(calls[0].2, "Cho ngoi da duoc xac nhan");
    }

    #[tokio::test]
    async fn detached_dispatch_stores_the_record() {
        let h = Harness::new(policy(RetryScope::FailedOnly));
        let user = h.user();

        h.dispatcher
            .dispatch_detached(request(user, NotificationType::PostComment));

        for _ in 0..50 {
            if h.notifications.len() == 1 && !h.email.calls().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(h.notifications.len(), 1);
        assert_eq!(h.email.calls().len(), 1);
    }

    #[test]
    fn policy_cap_never_exceeds_hard_limit() {
        let config = NotificationConfig {
            max_retries: 10,
            ..NotificationConfig::default()
        };
        assert_eq!(RetryPolicy::from_config(&config).max_retries, MAX_RETRIES);
    }
}
