//! Notification entity model and its delivery state machine.

use std::collections::BTreeMap;

use busway_core::config::RetryScope;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::category::NotificationType;
use super::channel::DeliveryChannel;

/// Delivery status of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    /// No channel has been attempted.
    Pending,
    /// Every attempted channel delivered.
    Sent,
    /// At least one attempted channel failed.
    Failed,
    /// A retry is in flight.
    Retrying,
}

/// Kind of entity a notification points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "related_entity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RelatedEntity {
    /// A booking reference.
    Booking,
    /// A community post.
    Post,
    /// A route review.
    Review,
    /// A journey.
    Journey,
}

/// Title and message in one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// Localised title.
    pub title: String,
    /// Localised message.
    pub message: String,
}

/// A notification addressed to one user, with per-channel delivery outcome.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub user_id: Uuid,
    /// What triggered the notification.
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub message: String,
    /// Optional translations keyed by locale.
    pub translations: Option<Json<BTreeMap<String, LocalizedText>>>,
    /// Channels attempted on the first dispatch.
    pub channels: Vec<DeliveryChannel>,
    /// Aggregate delivery status.
    pub status: NotificationStatus,
    /// Whether email delivery has succeeded.
    pub email_sent: bool,
    /// Whether push delivery has succeeded.
    pub push_sent: bool,
    /// Last email transport error.
    pub email_error: Option<String>,
    /// Last push transport error.
    pub push_error: Option<String>,
    /// Number of retries performed.
    pub retry_count: i32,
    /// When the next retry is due, or when the lease on a running retry
    /// expires; `None` when no retry is scheduled.
    pub next_attempt_at: Option<DateTime<Utc>>,
    /// Whether the user has read this notification.
    pub is_read: bool,
    /// When the notification was first read.
    pub read_at: Option<DateTime<Utc>>,
    /// Related entity identifier.
    pub related_id: Option<Uuid>,
    /// Related entity kind.
    pub related_type: Option<RelatedEntity>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// When the notification was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for a new dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    /// Recipient.
    pub user_id: Uuid,
    /// Notification type.
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// Title.
    pub title: String,
    /// Message.
    pub message: String,
    /// Requested channels.
    #[serde(default)]
    pub channels: Vec<DeliveryChannel>,
    /// Related entity identifier.
    #[serde(default)]
    pub related_id: Option<Uuid>,
    /// Related entity kind.
    #[serde(default)]
    pub related_type: Option<RelatedEntity>,
    /// Optional translations keyed by locale.
    #[serde(default)]
    pub translations: Option<BTreeMap<String, LocalizedText>>,
}

impl Notification {
    /// Build a pending record for a new dispatch.
    ///
    /// `attempted` is the channel list after preference filtering; the
    /// caller's requested channels are not kept.
    pub fn from_new(
        new: NewNotification,
        attempted: Vec<DeliveryChannel>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            notification_type: new.notification_type,
            title: new.title,
            message: new.message,
            translations: new.translations.map(Json),
            channels: DeliveryChannel::normalize(&attempted),
            status: NotificationStatus::Pending,
            email_sent: false,
            push_sent: false,
            email_error: None,
            push_error: None,
            retry_count: 0,
            next_attempt_at: None,
            is_read: false,
            read_at: None,
            related_id: new.related_id,
            related_type: new.related_type,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given channel has delivered.
    pub fn is_sent_on(&self, channel: DeliveryChannel) -> bool {
        match channel {
            DeliveryChannel::Email => self.email_sent,
            DeliveryChannel::Push => self.push_sent,
        }
    }

    /// Record a delivery outcome for one channel.
    ///
    /// Success advances the status to `Sent` unless an earlier channel in
    /// the same attempt already set `Failed`; failure always sets `Failed`.
    pub fn record_delivery(&mut self, channel: DeliveryChannel, error: Option<String>) {
        let (sent, last_error) = match channel {
            DeliveryChannel::Email => (&mut self.email_sent, &mut self.email_error),
            DeliveryChannel::Push => (&mut self.push_sent, &mut self.push_error),
        };
        match error {
            None => {
                *sent = true;
                *last_error = None;
                if self.status != NotificationStatus::Failed {
                    self.status = NotificationStatus::Sent;
                }
            }
            Some(message) => {
                *last_error = Some(message);
                self.status = NotificationStatus::Failed;
            }
        }
    }

    /// Channels a retry should re-attempt, before preference checks.
    pub fn retry_channels(&self, scope: RetryScope) -> Vec<DeliveryChannel> {
        self.channels
            .iter()
            .copied()
            .filter(|ch| match scope {
                RetryScope::FailedOnly => !self.is_sent_on(*ch),
                RetryScope::AllAttempted => true,
            })
            .collect()
    }

    /// Whether a retry sweep may claim this record at `now`.
    ///
    /// Covers failed records past their deadline and `Retrying` records
    /// whose lease has run out.
    pub fn is_retry_due(&self, now: DateTime<Utc>) -> bool {
        matches!(
            self.status,
            NotificationStatus::Failed | NotificationStatus::Retrying
        ) && self.next_attempt_at.is_some_and(|at| at <= now)
    }

    /// Claim a due retry under a lease ending at `lease_until`.
    ///
    /// A failed record consumes one retry. A `Retrying` record with an
    /// expired lease resumes the same attempt and keeps its count.
    pub fn claim_retry(&mut self, now: DateTime<Utc>, lease_until: DateTime<Utc>) {
        if self.status == NotificationStatus::Failed {
            self.retry_count += 1;
        }
        self.status = NotificationStatus::Retrying;
        self.next_attempt_at = Some(lease_until);
        self.updated_at = now;
    }

    /// A retry that could attempt no channel leaves the record failed for good.
    pub fn abandon_retry(&mut self, now: DateTime<Utc>) {
        self.status = NotificationStatus::Failed;
        self.next_attempt_at = None;
        self.updated_at = now;
    }

    /// Set or clear the durable retry deadline after an attempt.
    ///
    /// Returns `true` when a retry was scheduled.
    pub fn schedule_retry(&mut self, now: DateTime<Utc>, delay: Duration, max_retries: i32) -> bool {
        self.updated_at = now;
        if self.status == NotificationStatus::Failed && self.retry_count < max_retries {
            self.next_attempt_at = Some(now + delay);
            true
        } else {
            self.next_attempt_at = None;
            false
        }
    }

    /// Whether no further delivery attempt will happen.
    pub fn is_terminal(&self) -> bool {
        match self.status {
            NotificationStatus::Sent => true,
            NotificationStatus::Failed => self.next_attempt_at.is_none(),
            NotificationStatus::Pending => self.next_attempt_at.is_none(),
            NotificationStatus::Retrying => false,
        }
    }

    /// Mark as read. Returns `false` when it was already read.
    pub fn mark_read(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_read {
            return false;
        }
        self.is_read = true;
        self.read_at = Some(now);
        self.updated_at = now;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(channels: Vec<DeliveryChannel>) -> Notification {
        Notification::from_new(
            NewNotification {
                user_id: Uuid::new_v4(),
                notification_type: NotificationType::BookingConfirmation,
                title: "Booked".into(),
                message: "See you on board".into(),
                channels: vec![DeliveryChannel::Email, DeliveryChannel::Push],
                related_id: None,
                related_type: Some(RelatedEntity::Booking),
                translations: None,
            },
            channels,
            Utc::now(),
        )
    }

    #[test]
    fn record_keeps_attempted_channels_only() {
        let n = pending(vec![DeliveryChannel::Push, DeliveryChannel::Push]);
        assert_eq!(n.channels, vec![DeliveryChannel::Push]);
        assert!(pending(vec![]).channels.is_empty());
    }

    #[test]
    fn failure_sticks_after_later_success() {
        let mut n = pending(vec![DeliveryChannel::Email, DeliveryChannel::Push]);
        n.record_delivery(DeliveryChannel::Email, Some("smtp down".into()));
        n.record_delivery(DeliveryChannel::Push, None);
        assert_eq!(n.status, NotificationStatus::Failed);
        assert!(n.push_sent);
        assert!(!n.email_sent);
        assert_eq!(n.email_error.as_deref(), Some("smtp down"));
    }

    #[test]
    fn success_then_failure_is_failed() {
        let mut n = pending(vec![DeliveryChannel::Email, DeliveryChannel::Push]);
        n.record_delivery(DeliveryChannel::Email, None);
        assert_eq!(n.status, NotificationStatus::Sent);
        n.record_delivery(DeliveryChannel::Push, Some("no route".into()));
        assert_eq!(n.status, NotificationStatus::Failed);
        assert!(n.email_sent);
    }

    #[test]
    fn retry_schedule_is_bounded() {
        let now = Utc::now();
        let mut n = pending(vec![DeliveryChannel::Email]);
        n.record_delivery(DeliveryChannel::Email, Some("x".into()));
        for expected in 1..=3 {
            assert!(n.schedule_retry(now, Duration::seconds(60), 3));
            assert_eq!(n.next_attempt_at, Some(now + Duration::seconds(60)));
            n.claim_retry(now, now + Duration::minutes(5));
            assert_eq!(n.retry_count, expected);
            assert_eq!(n.status, NotificationStatus::Retrying);
            n.record_delivery(DeliveryChannel::Email, Some("x".into()));
        }
        assert!(!n.schedule_retry(now, Duration::seconds(60), 3));
        assert!(n.next_attempt_at.is_none());
        assert!(n.is_terminal());
        assert_eq!(n.retry_count, 3);
    }

    #[test]
    fn expired_lease_resumes_the_same_retry() {
        let now = Utc::now();
        let lease = Duration::minutes(5);
        let mut n = pending(vec![DeliveryChannel::Email]);
        n.record_delivery(DeliveryChannel::Email, Some("smtp down".into()));
        n.schedule_retry(now, Duration::seconds(60), 3);
        assert!(!n.is_retry_due(now));
        assert!(n.is_retry_due(now + Duration::seconds(60)));

        let claimed_at = now + Duration::seconds(60);
        n.claim_retry(claimed_at, claimed_at + lease);
        assert_eq!(n.retry_count, 1);
        assert_eq!(n.status, NotificationStatus::Retrying);
        assert!(!n.is_terminal());
        assert!(!n.is_retry_due(claimed_at + Duration::minutes(1)));

        let reclaimed_at = claimed_at + lease;
        assert!(n.is_retry_due(reclaimed_at));
        n.claim_retry(reclaimed_at, reclaimed_at + lease);
        assert_eq!(n.retry_count, 1);
        assert_eq!(n.next_attempt_at, Some(reclaimed_at + lease));
    }

    #[test]
    fn retry_channels_respect_scope() {
        let mut n = pending(vec![DeliveryChannel::Email, DeliveryChannel::Push]);
        n.record_delivery(DeliveryChannel::Email, None);
        n.record_delivery(DeliveryChannel::Push, Some("x".into()));
        assert_eq!(n.retry_channels(RetryScope::FailedOnly), vec![DeliveryChannel::Push]);
        assert_eq!(
            n.retry_channels(RetryScope::AllAttempted),
            vec![DeliveryChannel::Email, DeliveryChannel::Push]
        );
    }

    #[test]
    fn mark_read_is_idempotent() {
        let mut n = pending(vec![]);
        let first = Utc::now();
        assert!(n.mark_read(first));
        assert!(!n.mark_read(first + Duration::minutes(5)));
        assert_eq!(n.read_at, Some(first));
    }

    #[test]
    fn sent_is_terminal_and_never_rescheduled() {
        let mut n = pending(vec![DeliveryChannel::Push]);
        n.record_delivery(DeliveryChannel::Push, None);
        assert!(!n.schedule_retry(Utc::now(), Duration::seconds(60), 3));
        assert!(n.is_terminal());
    }
}
