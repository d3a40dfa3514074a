//! Community post handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use busway_core::types::pagination::PageResponse;
use busway_entity::post::{Comment, Post};

use crate::dto::request::{
    CommentRequest, CreatePostBody, PostListQuery, ReportRequest, UpdatePostBody,
};
use crate::dto::response::{ApiResponse, LikesResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<ApiResponse<PageResponse<Post>>>, ApiError> {
    let page = state
        .post_service
        .list_posts(query.category, query.sort, query.page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreatePostBody>,
) -> Result<(StatusCode, Json<ApiResponse<Post>>), ApiError> {
    req.validate()?;
    let post = state.post_service.create_post(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(post))))
}

/// GET /api/posts/trending
pub async fn trending(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Post>>>, ApiError> {
    let posts = state.post_service.trending().await?;
    Ok(Json(ApiResponse::ok(posts)))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Post>>, ApiError> {
    let post = state.post_service.get_post(id).await?;
    Ok(Json(ApiResponse::ok(post)))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePostBody>,
) -> Result<Json<ApiResponse<Post>>, ApiError> {
    req.validate()?;
    let post = state.post_service.update_post(&auth, id, req.into()).await?;
    Ok(Json(ApiResponse::ok(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.post_service.delete_post(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Post deleted"))))
}

/// POST /api/posts/{id}/like
pub async fn like_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LikesResponse>>, ApiError> {
    let likes_count = state.post_service.like_post(&auth, id).await?;
    Ok(Json(ApiResponse::ok(LikesResponse { likes_count })))
}

/// DELETE /api/posts/{id}/like
pub async fn unlike_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LikesResponse>>, ApiError> {
    let likes_count = state.post_service.unlike_post(&auth, id).await?;
    Ok(Json(ApiResponse::ok(LikesResponse { likes_count })))
}

/// GET /api/posts/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Comment>>>, ApiError> {
    let comments = state.post_service.list_comments(id).await?;
    Ok(Json(ApiResponse::ok(comments)))
}

/// POST /api/posts/{id}/comment
pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Comment>>), ApiError> {
    req.validate()?;
    let comment = state.post_service.add_comment(&auth, id, &req.content).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(comment))))
}

/// POST /api/posts/{id}/report
pub async fn report_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    req.validate()?;
    state
        .post_service
        .report_post(&auth, id, req.reason, req.description.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Post reported"))))
}
