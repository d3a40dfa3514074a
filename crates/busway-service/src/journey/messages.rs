//! Notifications emitted by journey lifecycle changes.

use busway_entity::journey::Journey;
use busway_entity::notification::{DeliveryChannel, NewNotification, NotificationType, RelatedEntity};
use busway_entity::route::BusRoute;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

fn journey_notification(
    journey: &Journey,
    notification_type: NotificationType,
    title: &str,
    message: String,
) -> NewNotification {
    NewNotification {
        user_id: journey.user_id,
        notification_type,
        title: title.to_string(),
        message,
        channels: vec![DeliveryChannel::Email, DeliveryChannel::Push],
        related_id: Some(journey.id),
        related_type: Some(RelatedEntity::Journey),
        translations: None,
    }
}

/// A new booking.
pub fn booking_confirmation(journey: &Journey, route: &BusRoute) -> NewNotification {
    journey_notification(
        journey,
        NotificationType::BookingConfirmation,
        "Booking confirmed",
        format!(
            "Booking {} on route {} ({}) departs {}.",
            journey.booking_id,
            route.route_number,
            route.name,
            journey.scheduled_date.format(DATE_FORMAT)
        ),
    )
}

/// A cancelled booking.
pub fn cancellation(journey: &Journey) -> NewNotification {
    journey_notification(
        journey,
        NotificationType::Cancellation,
        "Booking cancelled",
        format!(
            "Booking {} scheduled for {} has been cancelled.",
            journey.booking_id,
            journey.scheduled_date.format(DATE_FORMAT)
        ),
    )
}

/// A moved departure.
pub fn schedule_change(journey: &Journey, previous: &Journey) -> NewNotification {
    journey_notification(
        journey,
        NotificationType::ScheduleChange,
        "Schedule changed",
        format!(
            "Booking {} now departs {} instead of {}.",
            journey.booking_id,
            journey.scheduled_date.format(DATE_FORMAT),
            previous.scheduled_date.format(DATE_FORMAT)
        ),
    )
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use busway_entity::journey::JourneyStatus;

    use super::*;

    fn journey() -> Journey {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 8, 30, 0).unwrap();
        Journey {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            route_id: Uuid::new_v4(),
            booking_id: "BW-1042".into(),
            scheduled_date: at,
            completed_date: None,
            status: JourneyStatus::Upcoming,
            has_reviewed: false,
            review_id: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn cancellation_targets_the_traveller() {
        let j = journey();
        let n = cancellation(&j);
        assert_eq!(n.user_id, j.user_id);
        assert_eq!(n.notification_type, NotificationType::Cancellation);
        assert_eq!(n.related_id, Some(j.id));
        assert_eq!(n.related_type, Some(RelatedEntity::Journey));
        assert!(n.message.contains("BW-1042"));
        assert!(n.message.contains("2026-03-14 08:30 UTC"));
    }

    #[test]
    fn schedule_change_mentions_both_dates() {
        let before = journey();
        let mut after = before.clone();
        after.scheduled_date += Duration::hours(2);
        let n = schedule_change(&after, &before);
        assert_eq!(n.notification_type, NotificationType::ScheduleChange);
        assert!(n.message.contains("10:30"));
        assert!(n.message.contains("08:30"));
    }
}
