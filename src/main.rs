//! Busway server.
//!
//! Loads configuration, connects to PostgreSQL, applies migrations and
//! runs the HTTP API together with the sweep worker.

use tracing_subscriber::{EnvFilter, fmt};

use busway_core::config::AppConfig;
use busway_core::error::AppError;
use busway_database::DatabasePool;
use busway_database::migration::run_migrations;

#[tokio::main]
async fn main() {
    let env = std::env::var("BUSWAY_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, version = env!("CARGO_PKG_VERSION"), "Starting Busway");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;

    if config.database.run_migrations {
        run_migrations(pool.pool()).await?;
    }

    let result = busway_api::run_server(config, pool.pool().clone()).await;
    pool.close().await;
    result
}
