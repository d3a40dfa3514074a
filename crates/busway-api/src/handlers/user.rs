//! User self-service handlers.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use busway_entity::user::{User, UserStats};

use crate::dto::request::{LanguageRequest, PushTokenRequest, ThemeRequest, UpdateProfileBody};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.user_service.get_profile(&auth).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// PUT /api/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileBody>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    req.validate()?;
    let user = state.user_service.update_profile(&auth, req.into()).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// PUT /api/users/language
pub async fn set_language(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<LanguageRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()?;
    state.user_service.set_language(&auth, &req.language).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Language updated"))))
}

/// PUT /api/users/theme
pub async fn set_theme(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ThemeRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.user_service.set_theme(&auth, req.theme).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Theme updated"))))
}

/// PUT /api/users/push-token
pub async fn set_push_token(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<PushTokenRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()?;
    state
        .user_service
        .set_push_token(&auth, req.token.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Push token updated"))))
}

/// GET /api/users/stats
pub async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserStats>>, ApiError> {
    let stats = state.user_service.stats(&auth).await?;
    Ok(Json(ApiResponse::ok(stats)))
}
