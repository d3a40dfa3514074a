//! Application builder: wires router, middleware and state into an Axum app,
//! and runs it next to the sweep worker.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::PgPool;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use busway_core::config::AppConfig;
use busway_core::error::{AppError, ErrorKind};
use busway_worker::WorkerRunner;

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let server = state.config.server.clone();
    build_router(state)
        .layer(build_compression_layer())
        .layer(build_cors_layer(&server.cors))
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_seconds,
        )))
        .layer(TraceLayer::new_for_http())
}

/// Runs the HTTP server and the sweep worker until a shutdown signal arrives.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    let state = AppState::build(config, db_pool)?;
    let config = Arc::clone(&state.config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Background worker ────────────────────────────────────────
    let worker_handle = if config.worker.enabled {
        let runner = WorkerRunner::new(Arc::new(state.sweep_executor()), config.worker.clone());
        let cancel = shutdown_rx.clone();
        Some(tokio::spawn(async move { runner.run(cancel).await }))
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    // ── HTTP server ──────────────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
    })?;
    tracing::info!(%addr, "Busway server listening");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown");
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    // ── Drain ────────────────────────────────────────────────────
    if let Some(handle) = worker_handle {
        let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!("Worker did not stop within the shutdown grace period");
        }
    }

    tracing::info!("Busway server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
