//! Journey repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use busway_core::error::{AppError, ErrorKind};
use busway_core::result::AppResult;
use busway_entity::journey::{CreateJourney, Journey, JourneyStatus};

/// Repository for booked journeys.
#[derive(Debug, Clone)]
pub struct JourneyRepository {
    pool: PgPool,
}

impl JourneyRepository {
    /// Create a new journey repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a journey.
    pub async fn create(&self, data: &CreateJourney) -> AppResult<Journey> {
        sqlx::query_as::<_, Journey>(
            "INSERT INTO journeys (id, user_id, route_id, booking_id, scheduled_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.route_id)
        .bind(&data.booking_id)
        .bind(data.scheduled_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create journey", e))
    }

    /// Find a journey by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Journey>> {
        sqlx::query_as::<_, Journey>("SELECT * FROM journeys WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find journey", e))
    }

    /// A user's journeys, latest departure first.
    pub async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Journey>> {
        sqlx::query_as::<_, Journey>(
            "SELECT * FROM journeys WHERE user_id = $1 ORDER BY scheduled_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list journeys", e))
    }

    /// Change the lifecycle state; completing stamps `completed_date`.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: JourneyStatus,
        now: DateTime<Utc>,
    ) -> AppResult<Journey> {
        sqlx::query_as::<_, Journey>(
            "UPDATE journeys SET status = $2, \
             completed_date = CASE WHEN $2 = 'completed'::journey_status THEN $3 ELSE completed_date END, \
             updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update journey", e))?
        .ok_or_else(|| AppError::not_found(format!("Journey {id} not found")))
    }

    /// Move the departure.
    pub async fn reschedule(&self, id: Uuid, scheduled_date: DateTime<Utc>) -> AppResult<Journey> {
        sqlx::query_as::<_, Journey>(
            "UPDATE journeys SET scheduled_date = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(scheduled_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reschedule journey", e))?
        .ok_or_else(|| AppError::not_found(format!("Journey {id} not found")))
    }
}
