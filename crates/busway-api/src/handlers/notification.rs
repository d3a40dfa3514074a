//! Notification handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde_json::json;
use uuid::Uuid;

use busway_core::types::pagination::PageResponse;
use busway_entity::notification::{Notification, NotificationPreference};

use crate::dto::request::{NotificationListQuery, UpdatePreferencesRequest};
use crate::dto::response::{ApiResponse, CountResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<ApiResponse<PageResponse<Notification>>>, ApiError> {
    let result = state
        .notification_service
        .list_notifications(&auth, query.unread_only, query.page_request())
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.notification_service.unread_count(&auth).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Notification>>, ApiError> {
    let notification = state.notification_service.mark_read(&auth, id).await?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let count = state.notification_service.mark_all_read(&auth).await?;
    Ok(Json(ApiResponse::ok(json!({ "marked": count }))))
}

/// GET /api/notifications/preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<NotificationPreference>>, ApiError> {
    let prefs = state.notification_service.get_preferences(&auth).await?;
    Ok(Json(ApiResponse::ok(prefs)))
}

/// PUT /api/notifications/preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdatePreferencesRequest>,
) -> Result<Json<ApiResponse<NotificationPreference>>, ApiError> {
    let prefs = state
        .notification_service
        .update_preferences(&auth, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(prefs)))
}
