//! Bus route repository.

use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use busway_core::error::{AppError, ErrorKind};
use busway_core::result::AppResult;
use busway_entity::review::RatingSummary;
use busway_entity::route::{BusRoute, CreateBusRoute};

/// Repository for bus routes.
#[derive(Debug, Clone)]
pub struct BusRouteRepository {
    pool: PgPool,
}

impl BusRouteRepository {
    /// Create a new bus route repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a bus route. A duplicate route number is a conflict.
    pub async fn create(&self, data: &CreateBusRoute) -> AppResult<BusRoute> {
        sqlx::query_as::<_, BusRoute>(
            "INSERT INTO bus_routes (id, route_number, name, start_location, end_location, stops, \
             distance_km, average_duration_minutes) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.route_number)
        .bind(&data.name)
        .bind(Json(&data.start_location))
        .bind(Json(&data.end_location))
        .bind(Json(&data.stops))
        .bind(data.distance_km)
        .bind(data.average_duration_minutes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::conflict(format!("Route number {} already exists", data.route_number))
            }
            other => AppError::with_source(ErrorKind::Database, "Failed to create route", other),
        })
    }

    /// Find a bus route by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<BusRoute>> {
        sqlx::query_as::<_, BusRoute>("SELECT * FROM bus_routes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find route", e))
    }

    /// Routes currently in service, by route number.
    pub async fn list_active(&self) -> AppResult<Vec<BusRoute>> {
        sqlx::query_as::<_, BusRoute>(
            "SELECT * FROM bus_routes WHERE is_active ORDER BY route_number",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list routes", e))
    }

    /// Store recomputed rating aggregates.
    pub async fn update_rating(&self, id: Uuid, summary: &RatingSummary) -> AppResult<()> {
        sqlx::query(
            "UPDATE bus_routes SET average_rating = $2, total_reviews = $3, \
             rating_distribution = $4, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(summary.average_rating)
        .bind(i32::try_from(summary.total_reviews).unwrap_or(i32::MAX))
        .bind(Json(summary.rating_distribution))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update rating", e))?;
        Ok(())
    }
}
