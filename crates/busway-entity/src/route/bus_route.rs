//! Bus route entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use crate::review::RatingDistribution;

/// A named point on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Human-readable address.
    #[serde(default)]
    pub address: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Location {
    /// `lat,lng` as used by directions APIs.
    pub fn as_query(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }
}

/// An intermediate stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Stop name.
    pub name: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Position along the route.
    pub order: i32,
}

/// A scheduled bus line.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BusRoute {
    /// Unique route identifier.
    pub id: Uuid,
    /// Public route number.
    pub route_number: String,
    /// Route name.
    pub name: String,
    /// Origin.
    pub start_location: Json<Location>,
    /// Terminus.
    pub end_location: Json<Location>,
    /// Stops in order.
    pub stops: Json<Vec<Stop>>,
    /// Length in kilometres.
    pub distance_km: f64,
    /// Typical travel time in minutes.
    pub average_duration_minutes: i32,
    /// Mean of visible review ratings.
    pub average_rating: f64,
    /// Number of visible reviews.
    pub total_reviews: i32,
    /// Per-star counts of visible reviews.
    pub rating_distribution: Json<RatingDistribution>,
    /// Whether the route is in service.
    pub is_active: bool,
    /// When the route was created.
    pub created_at: DateTime<Utc>,
    /// When the route was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data for a new bus route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBusRoute {
    /// Public route number.
    pub route_number: String,
    /// Route name.
    pub name: String,
    /// Origin.
    pub start_location: Location,
    /// Terminus.
    pub end_location: Location,
    /// Stops.
    #[serde(default)]
    pub stops: Vec<Stop>,
    /// Length in kilometres.
    pub distance_km: f64,
    /// Typical travel time in minutes.
    pub average_duration_minutes: i32,
}
