//! Route planning handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use busway_entity::route::{BusRoute, SavedRoute};
use busway_service::planning::{PlanRequest, PlannedRoute, RouteComparison, SaveRouteRequest};

use crate::dto::request::CompareRoutesRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/route-planning/plan
pub async fn plan(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<PlanRequest>,
) -> Result<Json<ApiResponse<PlannedRoute>>, ApiError> {
    let route = state.planning_service.plan(&req).await?;
    Ok(Json(ApiResponse::ok(route)))
}

/// POST /api/route-planning/compare
pub async fn compare(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<CompareRoutesRequest>,
) -> Result<Json<ApiResponse<RouteComparison>>, ApiError> {
    req.validate()?;
    let comparison = state.planning_service.compare(req.routes).await?;
    Ok(Json(ApiResponse::ok(comparison)))
}

/// GET /api/route-planning/details/{route_id}
pub async fn route_details(
    State(state): State<AppState>,
    Path(route_id): Path<Uuid>,
) -> Result<Json<ApiResponse<BusRoute>>, ApiError> {
    let route = state.planning_service.route_details(route_id).await?;
    Ok(Json(ApiResponse::ok(route)))
}

/// POST /api/route-planning/save
pub async fn save_route(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SaveRouteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SavedRoute>>), ApiError> {
    let saved = state.planning_service.save_route(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(saved))))
}

/// GET /api/route-planning/saved
pub async fn saved_routes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<SavedRoute>>>, ApiError> {
    let routes = state.planning_service.saved_routes(&auth).await?;
    Ok(Json(ApiResponse::ok(routes)))
}

/// DELETE /api/route-planning/saved/{id}
pub async fn delete_saved_route(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.planning_service.delete_saved_route(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Saved route deleted"))))
}
