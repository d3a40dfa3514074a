//! Route definitions for the Busway HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with every route, the body limit and request logging.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(post_routes())
        .merge(review_routes())
        .merge(notification_routes())
        .merge(planning_routes())
        .merge(route_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Registration, login, email verification, current user
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/verify-email", post(handlers::auth::verify_email))
        .route("/auth/me", get(handlers::auth::me))
}

/// User self-service endpoints
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/profile",
            get(handlers::user::get_profile).put(handlers::user::update_profile),
        )
        .route("/users/language", put(handlers::user::set_language))
        .route("/users/theme", put(handlers::user::set_theme))
        .route("/users/push-token", put(handlers::user::set_push_token))
        .route("/users/stats", get(handlers::user::stats))
}

/// Community posts, likes, comments, reports
fn post_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/posts",
            get(handlers::post::list_posts).post(handlers::post::create_post),
        )
        .route("/posts/trending", get(handlers::post::trending))
        .route(
            "/posts/{id}",
            get(handlers::post::get_post)
                .put(handlers::post::update_post)
                .delete(handlers::post::delete_post),
        )
        .route(
            "/posts/{id}/like",
            post(handlers::post::like_post).delete(handlers::post::unlike_post),
        )
        .route("/posts/{id}/comments", get(handlers::post::list_comments))
        .route("/posts/{id}/comment", post(handlers::post::add_comment))
        .route("/posts/{id}/report", post(handlers::post::report_post))
}

/// Route reviews
fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", post(handlers::review::create_review))
        .route(
            "/reviews/{id}",
            put(handlers::review::update_review).delete(handlers::review::delete_review),
        )
        .route("/reviews/{id}/upvote", post(handlers::review::upvote_review))
        .route("/reviews/{id}/report", post(handlers::review::report_review))
        .route(
            "/reviews/route/{route_id}",
            get(handlers::review::list_route_reviews),
        )
        .route(
            "/reviews/route/{route_id}/stats",
            get(handlers::review::route_stats),
        )
}

/// Notification inbox and preferences
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/preferences",
            get(handlers::notification::get_preferences)
                .put(handlers::notification::update_preferences),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
}

/// Trip planning and saved routes
fn planning_routes() -> Router<AppState> {
    Router::new()
        .route("/route-planning/plan", post(handlers::planning::plan))
        .route("/route-planning/compare", post(handlers::planning::compare))
        .route(
            "/route-planning/details/{route_id}",
            get(handlers::planning::route_details),
        )
        .route("/route-planning/save", post(handlers::planning::save_route))
        .route("/route-planning/saved", get(handlers::planning::saved_routes))
        .route(
            "/route-planning/saved/{id}",
            delete(handlers::planning::delete_saved_route),
        )
}

/// Bus routes and the caller's journeys
fn route_routes() -> Router<AppState> {
    Router::new()
        .route("/routes", get(handlers::route::list_routes))
        .route("/routes/{id}", get(handlers::route::get_route))
        .route("/journeys", get(handlers::route::my_journeys))
}

/// Admin operations
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/routes", post(handlers::admin::create_route))
        .route("/admin/journeys", post(handlers::admin::create_journey))
        .route(
            "/admin/journeys/{id}/status",
            put(handlers::admin::set_journey_status),
        )
        .route(
            "/admin/journeys/{id}/schedule",
            put(handlers::admin::reschedule_journey),
        )
        .route(
            "/admin/notifications",
            post(handlers::admin::send_notification),
        )
}

/// Liveness and readiness
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
