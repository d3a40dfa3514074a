//! Route review handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use busway_core::types::pagination::PageResponse;
use busway_entity::review::{RatingSummary, Review};

use crate::dto::request::{CreateReviewBody, ReportRequest, ReviewListQuery, UpdateReviewBody};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/reviews
pub async fn create_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateReviewBody>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), ApiError> {
    req.validate()?;
    let review = state.review_service.create_review(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(review))))
}

/// PUT /api/reviews/{id}
pub async fn update_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateReviewBody>,
) -> Result<Json<ApiResponse<Review>>, ApiError> {
    req.validate()?;
    let review = state
        .review_service
        .update_review(&auth, id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(review)))
}

/// DELETE /api/reviews/{id}
pub async fn delete_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.review_service.delete_review(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Review deleted"))))
}

/// POST /api/reviews/{id}/upvote
pub async fn upvote_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Review>>, ApiError> {
    let review = state.review_service.upvote_review(&auth, id).await?;
    Ok(Json(ApiResponse::ok(review)))
}

/// POST /api/reviews/{id}/report
pub async fn report_review(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()?;
    state
        .review_service
        .report_review(&auth, id, req.reason, req.description.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Review reported"))))
}

/// GET /api/reviews/route/{route_id}
pub async fn list_route_reviews(
    State(state): State<AppState>,
    Path(route_id): Path<Uuid>,
    Query(query): Query<ReviewListQuery>,
) -> Result<Json<ApiResponse<PageResponse<Review>>>, ApiError> {
    let page = state
        .review_service
        .list_route_reviews(route_id, query.sort, query.page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/reviews/route/{route_id}/stats
pub async fn route_stats(
    State(state): State<AppState>,
    Path(route_id): Path<Uuid>,
) -> Result<Json<ApiResponse<RatingSummary>>, ApiError> {
    let summary = state.review_service.route_stats(route_id).await?;
    Ok(Json(ApiResponse::ok(summary)))
}
