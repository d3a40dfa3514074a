//! Bus route and journey handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use busway_entity::journey::Journey;
use busway_entity::route::BusRoute;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/routes
pub async fn list_routes(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BusRoute>>>, ApiError> {
    let routes = state.journey_service.list_routes().await?;
    Ok(Json(ApiResponse::ok(routes)))
}

/// GET /api/routes/{id}
pub async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BusRoute>>, ApiError> {
    let route = state.journey_service.get_route(id).await?;
    Ok(Json(ApiResponse::ok(route)))
}

/// GET /api/journeys
pub async fn my_journeys(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<Journey>>>, ApiError> {
    let journeys = state.journey_service.my_journeys(&auth).await?;
    Ok(Json(ApiResponse::ok(journeys)))
}
