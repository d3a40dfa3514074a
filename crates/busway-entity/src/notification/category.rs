//! Notification type enumeration and preference grouping.

use serde::{Deserialize, Serialize};

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    /// A booking was created.
    BookingConfirmation,
    /// A booking was cancelled.
    Cancellation,
    /// A booked departure moved.
    ScheduleChange,
    /// An upcoming journey reminder.
    JourneyReminder,
    /// Marketing message (opt-in).
    Promotion,
    /// Someone liked the user's post.
    PostLike,
    /// Someone commented on the user's post.
    PostComment,
    /// Someone responded to the user's review.
    ReviewResponse,
}

/// Preference bucket a notification type is controlled by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceGroup {
    /// Booking confirmations.
    BookingConfirmation,
    /// Cancellations.
    Cancellation,
    /// Schedule changes.
    ScheduleChange,
    /// Journey reminders.
    JourneyReminder,
    /// Promotions.
    Promotion,
    /// Likes, comments and review responses.
    Social,
}

impl NotificationType {
    /// Every notification type, in declaration order.
    pub const ALL: [NotificationType; 8] = [
        Self::BookingConfirmation,
        Self::Cancellation,
        Self::ScheduleChange,
        Self::JourneyReminder,
        Self::Promotion,
        Self::PostLike,
        Self::PostComment,
        Self::ReviewResponse,
    ];

    /// The preference group that gates this type.
    pub fn group(&self) -> PreferenceGroup {
        match self {
            Self::BookingConfirmation => PreferenceGroup::BookingConfirmation,
            Self::Cancellation => PreferenceGroup::Cancellation,
            Self::ScheduleChange => PreferenceGroup::ScheduleChange,
            Self::JourneyReminder => PreferenceGroup::JourneyReminder,
            Self::Promotion => PreferenceGroup::Promotion,
            Self::PostLike | Self::PostComment | Self::ReviewResponse => PreferenceGroup::Social,
        }
    }

    /// Return the type as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BookingConfirmation => "booking-confirmation",
            Self::Cancellation => "cancellation",
            Self::ScheduleChange => "schedule-change",
            Self::JourneyReminder => "journey-reminder",
            Self::Promotion => "promotion",
            Self::PostLike => "post-like",
            Self::PostComment => "post-comment",
            Self::ReviewResponse => "review-response",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NotificationType {
    type Err = busway_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| busway_core::AppError::validation(format!("Unknown notification type: '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn social_types_share_a_group() {
        assert_eq!(NotificationType::PostLike.group(), PreferenceGroup::Social);
        assert_eq!(NotificationType::PostComment.group(), PreferenceGroup::Social);
        assert_eq!(NotificationType::ReviewResponse.group(), PreferenceGroup::Social);
        assert_eq!(NotificationType::Promotion.group(), PreferenceGroup::Promotion);
    }

    #[test]
    fn parses_kebab_case() {
        let parsed: NotificationType = "schedule-change".parse().unwrap();
        assert_eq!(parsed, NotificationType::ScheduleChange);
        assert!("sms".parse::<NotificationType>().is_err());
        let json = serde_json::to_string(&NotificationType::BookingConfirmation).unwrap();
        assert_eq!(json, "\"booking-confirmation\"");
    }
}
