//! # busway-api
//!
//! HTTP API layer for Busway built on Axum.
//!
//! Handlers are thin: they extract the caller, validate the request body
//! and delegate to the services in `busway-service`. Every response uses
//! the `{ "success": true, "data": ... }` envelope; errors are rendered by
//! [`error::ApiError`].

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
