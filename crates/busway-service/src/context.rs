//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use busway_core::error::AppError;
use busway_entity::user::{User, UserRole};

/// Context for the current authenticated request.
///
/// Built by the auth extractor from a freshly loaded user and passed into
/// service methods so every operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// Current role.
    pub role: UserRole,
    /// Display name.
    pub name: String,
    /// Whether the email address is verified.
    pub is_verified: bool,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for `user`.
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            name: user.name.clone(),
            is_verified: user.is_verified,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Author-or-admin check.
    pub fn can_modify(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id || self.is_admin()
    }

    /// Fails unless the email address is verified.
    pub fn require_verified(&self) -> Result<(), AppError> {
        if self.is_verified {
            Ok(())
        } else {
            Err(AppError::authorization("Please verify your email first"))
        }
    }

    /// Fails unless the user is an admin.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::authorization("Admin access required"))
        }
    }
}
