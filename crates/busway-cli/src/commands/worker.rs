//! Background worker commands.

use chrono::Utc;
use clap::{Args, Subcommand};

use busway_core::config::AppConfig;
use busway_core::error::AppError;

use crate::output;

/// Arguments for worker commands
#[derive(Debug, Args)]
pub struct WorkerArgs {
    /// Worker subcommand
    #[command(subcommand)]
    pub command: WorkerCommand,
}

/// Worker subcommands
#[derive(Debug, Subcommand)]
pub enum WorkerCommand {
    /// Run every sweep once and print the summaries
    Sweep,
}

/// Execute worker commands
pub async fn execute(args: &WorkerArgs, config: AppConfig) -> Result<(), AppError> {
    let state = super::build_state(config).await?;

    match &args.command {
        WorkerCommand::Sweep => {
            let executor = state.sweep_executor();
            let mut failed = 0;
            for run in executor.run_all(Utc::now()).await {
                match run.result {
                    Ok(summary) => output::print_kv(&run.task, &summary.to_string()),
                    Err(e) => {
                        failed += 1;
                        output::print_error(&format!("{}: {e}", run.task));
                    }
                }
            }
            if failed > 0 {
                return Err(AppError::internal(format!("{failed} sweep(s) failed")));
            }
            output::print_success("Sweeps complete.");
        }
    }

    Ok(())
}
