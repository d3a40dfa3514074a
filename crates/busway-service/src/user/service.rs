//! User self-service: profile, display preferences, push token, activity stats.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use busway_core::error::AppError;
use busway_database::repositories::UserRepository;
use busway_entity::user::{Theme, User, UserStats};

use crate::context::RequestContext;

/// Longest accepted bio.
pub const MAX_BIO_LENGTH: usize = 500;

/// Data for updating a user's own profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name.
    pub name: Option<String>,
    /// New bio.
    pub bio: Option<String>,
    /// New profile picture URL.
    pub profile_picture: Option<String>,
}

impl UpdateProfileRequest {
    fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("Name cannot be empty"));
            }
        }
        if let Some(bio) = &self.bio {
            if bio.chars().count() > MAX_BIO_LENGTH {
                return Err(AppError::validation(format!(
                    "Bio must be at most {MAX_BIO_LENGTH} characters"
                )));
            }
        }
        Ok(())
    }
}

/// Handles user self-service operations.
#[derive(Debug, Clone)]
pub struct UserService {
    /// User repository.
    user_repo: Arc<UserRepository>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Gets the current user's full profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Updates the current user's profile fields.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        req: UpdateProfileRequest,
    ) -> Result<User, AppError> {
        req.validate()?;
        let user = self
            .user_repo
            .update_profile(
                ctx.user_id,
                req.name.as_deref().map(str::trim),
                req.bio.as_deref(),
                req.profile_picture.as_deref(),
            )
            .await?;
        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    /// Sets the preferred language.
    pub async fn set_language(&self, ctx: &RequestContext, language: &str) -> Result<(), AppError> {
        let language = language.trim();
        if language.is_empty() {
            return Err(AppError::validation("Language is required"));
        }
        self.user_repo.set_language(ctx.user_id, language).await
    }

    /// Sets the UI theme.
    pub async fn set_theme(&self, ctx: &RequestContext, theme: Theme) -> Result<(), AppError> {
        self.user_repo.set_theme(ctx.user_id, theme).await
    }

    /// Registers or clears the device token used for push delivery.
    pub async fn set_push_token(
        &self,
        ctx: &RequestContext,
        token: Option<&str>,
    ) -> Result<(), AppError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        self.user_repo.set_push_token(ctx.user_id, token).await?;
        info!(user_id = %ctx.user_id, registered = token.is_some(), "Push token updated");
        Ok(())
    }

    /// Activity counters computed from live data.
    pub async fn stats(&self, ctx: &RequestContext) -> Result<UserStats, AppError> {
        self.user_repo.stats(ctx.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_bio_is_rejected() {
        let req = UpdateProfileRequest {
            bio: Some("x".repeat(MAX_BIO_LENGTH + 1)),
            ..UpdateProfileRequest::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let req = UpdateProfileRequest {
            name: Some("   ".into()),
            ..UpdateProfileRequest::default()
        };
        assert!(req.validate().is_err());
        assert!(UpdateProfileRequest::default().validate().is_ok());
    }
}
