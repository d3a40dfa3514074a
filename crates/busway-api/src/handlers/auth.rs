//! Authentication handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use validator::Validate;

use busway_entity::user::User;
use busway_service::user::AuthSession;

use crate::dto::request::{LoginRequest, RegisterRequest, VerifyEmailRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthSession>>), ApiError> {
    req.validate()?;
    let session = state
        .auth_service
        .register(&req.name, &req.email, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(session))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, ApiError> {
    req.validate()?;
    let session = state.auth_service.login(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::ok(session)))
}

/// POST /api/auth/verify-email
pub async fn verify_email(
    State(state): State<AppState>,
    Json(req): Json<VerifyEmailRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    req.validate()?;
    let user = state.auth_service.verify_email(&req.token).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.user_service.get_profile(&auth).await?;
    Ok(Json(ApiResponse::ok(user)))
}
