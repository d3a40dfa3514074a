//! Admin user management: listing, manual verification, role changes.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use busway_core::error::AppError;
use busway_core::types::pagination::{PageRequest, PageResponse};
use busway_database::repositories::UserRepository;
use busway_entity::user::{User, UserRole};

/// Operator-level user management, used by the CLI.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    /// User repository.
    user_repo: Arc<UserRepository>,
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Lists all users with pagination.
    pub async fn list_users(&self, page: PageRequest) -> Result<PageResponse<User>, AppError> {
        self.user_repo.list(&page).await
    }

    /// Finds a user by ID or email address.
    pub async fn find_user(&self, id_or_email: &str) -> Result<User, AppError> {
        let found = match Uuid::parse_str(id_or_email) {
            Ok(id) => self.user_repo.find_by_id(id).await?,
            Err(_) => {
                self.user_repo
                    .find_by_email(&id_or_email.trim().to_lowercase())
                    .await?
            }
        };
        found.ok_or_else(|| AppError::not_found(format!("User '{id_or_email}' not found")))
    }

    /// Marks a user's email as verified without a token.
    pub async fn verify_user(&self, id_or_email: &str) -> Result<User, AppError> {
        let user = self.find_user(id_or_email).await?;
        let user = self.user_repo.mark_verified(user.id).await?;
        info!(user_id = %user.id, "User verified by operator");
        Ok(user)
    }

    /// Changes a user's role.
    pub async fn change_role(&self, id_or_email: &str, role: UserRole) -> Result<User, AppError> {
        let user = self.find_user(id_or_email).await?;
        let user = self.user_repo.set_role(user.id, role).await?;
        info!(user_id = %user.id, role = %user.role, "User role changed");
        Ok(user)
    }
}
