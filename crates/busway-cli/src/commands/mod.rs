//! CLI command definitions and dispatch.

pub mod migrate;
pub mod notify;
pub mod user;
pub mod worker;

use clap::{Parser, Subcommand};
use sqlx::PgPool;

use busway_api::AppState;
use busway_core::config::AppConfig;
use busway_core::error::AppError;
use busway_database::DatabasePool;

use crate::output::OutputFormat;

/// Busway administration
#[derive(Debug, Parser)]
#[command(name = "busway-cli", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (`config/{env}.toml` overlays `config/default.toml`)
    #[arg(short, long, env = "BUSWAY_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// User management
    User(user::UserArgs),
    /// Send a notification through the dispatcher
    Notify(notify::NotifyArgs),
    /// Background worker operations
    Worker(worker::WorkerArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::User(args) => user::execute(args, config, self.format).await,
            Commands::Notify(args) => notify::execute(args, config, self.format).await,
            Commands::Worker(args) => worker::execute(args, config).await,
        }
    }
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<PgPool, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    Ok(pool.into_pool())
}

/// Helper: connect and wire every service the way the server does
pub async fn build_state(config: AppConfig) -> Result<AppState, AppError> {
    let pool = create_db_pool(&config).await?;
    AppState::build(config, pool)
}
