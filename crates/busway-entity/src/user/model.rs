//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;
use super::theme::Theme;

/// A registered Busway account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Lower-cased, unique email address.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Whether the email address has been verified.
    pub is_verified: bool,
    /// Account role.
    pub role: UserRole,
    /// Preferred language code.
    pub language: String,
    /// Preferred UI theme.
    pub theme: Theme,
    /// Profile picture URL.
    pub profile_picture: Option<String>,
    /// Short biography.
    pub bio: Option<String>,
    /// Device token used by the push channel.
    #[serde(skip_serializing, default)]
    pub push_token: Option<String>,
    /// Number of posts authored.
    pub posts_count: i32,
    /// Number of comments authored.
    pub comments_count: i32,
    /// Likes received across all posts.
    pub likes_received: i32,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether the push channel can reach this user.
    pub fn has_push_token(&self) -> bool {
        self.push_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Display name.
    pub name: String,
    /// Email address, normalised by the caller.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
}

/// Activity counters shown on the profile page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct UserStats {
    /// Visible posts authored.
    pub posts_count: i64,
    /// Visible comments authored.
    pub comments_count: i64,
    /// Likes received.
    pub likes_received: i64,
}
