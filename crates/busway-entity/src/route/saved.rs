//! Saved route entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::bus_route::Location;

/// A planned route bookmarked by a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavedRoute {
    /// Unique identifier.
    pub id: Uuid,
    /// Owner.
    pub user_id: Uuid,
    /// Label.
    pub name: String,
    /// Origin.
    pub start_location: Json<Location>,
    /// Destination.
    pub destination: Json<Location>,
    /// Waypoints.
    pub waypoints: Json<Vec<Location>>,
    /// Distance in kilometres.
    pub distance_km: f64,
    /// Duration in minutes.
    pub duration_minutes: i32,
    /// Traffic snapshot from the provider.
    pub traffic_info: Option<Json<serde_json::Value>>,
    /// Encoded overview polyline.
    pub polyline: Option<String>,
    /// Marked as favourite.
    pub is_favorite: bool,
    /// When the route was saved.
    pub created_at: DateTime<Utc>,
    /// When the route was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data for a new saved route.
#[derive(Debug, Clone)]
pub struct CreateSavedRoute {
    /// Owner.
    pub user_id: Uuid,
    /// Label.
    pub name: String,
    /// Origin.
    pub start_location: Location,
    /// Destination.
    pub destination: Location,
    /// Waypoints.
    pub waypoints: Vec<Location>,
    /// Distance in kilometres.
    pub distance_km: f64,
    /// Duration in minutes.
    pub duration_minutes: i32,
    /// Traffic snapshot.
    pub traffic_info: Option<serde_json::Value>,
    /// Overview polyline.
    pub polyline: Option<String>,
    /// Favourite flag.
    pub is_favorite: bool,
}
