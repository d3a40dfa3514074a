//! Registration, login and email verification.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use busway_auth::jwt::{JwtDecoder, JwtEncoder};
use busway_auth::password::{PasswordHasher, PasswordValidator};
use busway_core::error::AppError;
use busway_database::repositories::UserRepository;
use busway_entity::user::{CreateUser, User, UserRole};

use crate::notification::DeliveryTransport;

/// An authenticated session returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// The user.
    pub user: User,
    /// Bearer access token.
    pub token: String,
    /// When the access token expires.
    pub expires_at: DateTime<Utc>,
}

/// Handles account creation and credential checks.
pub struct AuthService {
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password validator.
    validator: Arc<PasswordValidator>,
    /// Token issuer.
    encoder: Arc<JwtEncoder>,
    /// Token verifier.
    decoder: Arc<JwtDecoder>,
    /// Channel carrying verification links.
    mailer: Arc<dyn DeliveryTransport>,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService").finish_non_exhaustive()
    }
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        mailer: Arc<dyn DeliveryTransport>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            validator,
            encoder,
            decoder,
            mailer,
        }
    }

    /// Registers a new account and mails a verification token.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Name is required"));
        }
        let email = normalize_email(email)?;
        self.validator.validate(password)?;

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }

        let user = self
            .user_repo
            .create(&CreateUser {
                name: name.to_string(),
                email,
                password_hash: self.hasher.hash_password(password)?,
                role: UserRole::User,
            })
            .await?;

        let verification = self.encoder.verification_token(&user)?;
        let report = self
            .mailer
            .send(
                &user.email,
                "Verify your Busway account",
                &format!(
                    "Welcome to Busway, {}! Use this token to verify your email: {}",
                    user.name, verification.token
                ),
            )
            .await;
        if let Some(error) = report.into_error() {
            warn!(user_id = %user.id, error = %error, "Verification email not delivered");
        }

        info!(user_id = %user.id, "User registered");
        self.session(user)
    }

    /// Exchanges credentials for an access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let invalid = || AppError::authentication("Invalid email or password");

        let email = normalize_email(email).map_err(|_| invalid())?;
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or_else(invalid)?;

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(invalid());
        }

        info!(user_id = %user.id, "User logged in");
        self.session(user)
    }

    /// Marks the token's user as verified.
    pub async fn verify_email(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decoder.decode_verification_token(token)?;
        let user = self
            .user_repo
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        if user.email != claims.email {
            return Err(AppError::authentication("Verification token no longer valid"));
        }
        if user.is_verified {
            return Ok(user);
        }

        let user = self.user_repo.mark_verified(user.id).await?;
        info!(user_id = %user.id, "Email verified");
        Ok(user)
    }

    fn session(&self, user: User) -> Result<AuthSession, AppError> {
        let issued = self.encoder.access_token(&user)?;
        Ok(AuthSession {
            user,
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }
}

/// Trim and lowercase an address, rejecting obviously malformed ones.
pub fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(AppError::validation("Invalid email format"))
    }
}
