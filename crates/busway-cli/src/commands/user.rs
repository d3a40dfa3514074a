//! User management CLI commands.

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use busway_core::config::AppConfig;
use busway_core::error::AppError;
use busway_core::types::pagination::PageRequest;
use busway_entity::user::{User, UserRole};

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List users, newest first
    List {
        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Users per page
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },
    /// Mark a user's email as verified
    Verify {
        /// User ID or email
        user: String,
    },
    /// Change a user's role
    Role {
        /// User ID or email
        user: String,
        /// New role
        #[arg(value_enum)]
        role: RoleArg,
    },
}

/// Role accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    /// Regular traveller
    User,
    /// Community moderator
    Moderator,
    /// Platform administrator
    Admin,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::User => UserRole::User,
            RoleArg::Moderator => UserRole::Moderator,
            RoleArg::Admin => UserRole::Admin,
        }
    }
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// User ID
    id: String,
    /// Name
    name: String,
    /// Email
    email: String,
    /// Role
    role: String,
    /// Verified
    verified: bool,
    /// Created at
    created_at: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role.to_string(),
            verified: u.is_verified,
            created_at: u.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = super::build_state(config).await?;
    let admin = &state.admin_user_service;

    match &args.command {
        UserCommand::List { page, limit } => {
            let users = admin.list_users(PageRequest::new(*page, *limit)).await?;
            let rows: Vec<UserRow> = users.items.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
            output::print_kv(
                "Page",
                &format!("{} of {} ({} users)", users.page, users.total_pages, users.total),
            );
        }
        UserCommand::Verify { user } => {
            let user = admin.verify_user(user).await?;
            output::print_success(&format!("User '{}' verified", user.email));
        }
        UserCommand::Role { user, role } => {
            let user = admin.change_role(user, (*role).into()).await?;
            output::print_success(&format!("User '{}' is now {}", user.email, user.role));
        }
    }

    Ok(())
}
