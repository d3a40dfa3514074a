//! Admin handlers. Role checks happen in the services.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use busway_entity::journey::Journey;
use busway_entity::notification::Notification;
use busway_entity::route::{BusRoute, CreateBusRoute};
use busway_service::journey::CreateJourneyRequest;

use crate::dto::request::{JourneyStatusRequest, RescheduleRequest, SendNotificationRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/admin/routes
pub async fn create_route(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateBusRoute>,
) -> Result<(StatusCode, Json<ApiResponse<BusRoute>>), ApiError> {
    let route = state.journey_service.create_route(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(route))))
}

/// POST /api/admin/journeys
pub async fn create_journey(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateJourneyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Journey>>), ApiError> {
    let journey = state.journey_service.create_journey(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(journey))))
}

/// PUT /api/admin/journeys/{id}/status
pub async fn set_journey_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<JourneyStatusRequest>,
) -> Result<Json<ApiResponse<Journey>>, ApiError> {
    let journey = state
        .journey_service
        .set_status(&auth, id, req.status)
        .await?;
    Ok(Json(ApiResponse::ok(journey)))
}

/// PUT /api/admin/journeys/{id}/schedule
pub async fn reschedule_journey(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RescheduleRequest>,
) -> Result<Json<ApiResponse<Journey>>, ApiError> {
    let journey = state
        .journey_service
        .reschedule(&auth, id, req.scheduled_date)
        .await?;
    Ok(Json(ApiResponse::ok(journey)))
}

/// POST /api/admin/notifications
///
/// Dispatches synchronously so the caller sees the delivery outcome.
pub async fn send_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SendNotificationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Notification>>), ApiError> {
    req.validate()?;
    let notification = state
        .journey_service
        .send_notification(&auth, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(notification))))
}
