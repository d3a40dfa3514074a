//! Saved route repository.

use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use busway_core::error::{AppError, ErrorKind};
use busway_core::result::AppResult;
use busway_entity::route::{CreateSavedRoute, SavedRoute};

/// Repository for routes bookmarked by users.
#[derive(Debug, Clone)]
pub struct SavedRouteRepository {
    pool: PgPool,
}

impl SavedRouteRepository {
    /// Create a new saved route repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Save a planned route.
    pub async fn create(&self, data: &CreateSavedRoute) -> AppResult<SavedRoute> {
        sqlx::query_as::<_, SavedRoute>(
            "INSERT INTO saved_routes (id, user_id, name, start_location, destination, waypoints, \
             distance_km, duration_minutes, traffic_info, polyline, is_favorite) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(&data.name)
        .bind(Json(&data.start_location))
        .bind(Json(&data.destination))
        .bind(Json(&data.waypoints))
        .bind(data.distance_km)
        .bind(data.duration_minutes)
        .bind(data.traffic_info.as_ref().map(Json))
        .bind(&data.polyline)
        .bind(data.is_favorite)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save route", e))
    }

    /// A user's saved routes, newest first.
    pub async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<SavedRoute>> {
        sqlx::query_as::<_, SavedRoute>(
            "SELECT * FROM saved_routes WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list saved routes", e))
    }

    /// Delete a saved route owned by `user_id`. Returns `false` when nothing matched.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM saved_routes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete saved route", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
