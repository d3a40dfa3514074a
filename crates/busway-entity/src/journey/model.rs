//! Journey entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a booked trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "journey_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum JourneyStatus {
    /// Booked, not yet departed.
    Upcoming,
    /// On the bus.
    InProgress,
    /// Arrived.
    Completed,
    /// Cancelled before departure.
    Cancelled,
}

/// A user's booked trip on a bus route.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Journey {
    /// Unique journey identifier.
    pub id: Uuid,
    /// Traveller.
    pub user_id: Uuid,
    /// Bus route travelled.
    pub route_id: Uuid,
    /// External booking reference.
    pub booking_id: String,
    /// Planned departure.
    pub scheduled_date: DateTime<Utc>,
    /// Actual arrival.
    pub completed_date: Option<DateTime<Utc>>,
    /// Lifecycle state.
    pub status: JourneyStatus,
    /// Whether a review was written for this journey.
    pub has_reviewed: bool,
    /// The review written for this journey.
    pub review_id: Option<Uuid>,
    /// When the journey was booked.
    pub created_at: DateTime<Utc>,
    /// When the journey was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Journey {
    /// Whether this journey can back a new review of `route_id` by `user_id`.
    pub fn is_reviewable_by(&self, user_id: Uuid, route_id: Uuid) -> bool {
        self.user_id == user_id
            && self.route_id == route_id
            && self.status == JourneyStatus::Completed
            && !self.has_reviewed
    }
}

/// Data for a new journey.
#[derive(Debug, Clone)]
pub struct CreateJourney {
    /// Traveller.
    pub user_id: Uuid,
    /// Bus route.
    pub route_id: Uuid,
    /// Booking reference.
    pub booking_id: String,
    /// Planned departure.
    pub scheduled_date: DateTime<Utc>,
}
