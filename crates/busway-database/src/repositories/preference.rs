//! Notification preference repository.

use sqlx::PgPool;
use uuid::Uuid;

use busway_core::error::{AppError, ErrorKind};
use busway_core::result::AppResult;
use busway_entity::notification::NotificationPreference;

/// Repository for per-user notification preferences.
#[derive(Debug, Clone)]
pub struct PreferenceRepository {
    pool: PgPool,
}

impl PreferenceRepository {
    /// Create a new preference repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the stored preferences, if any.
    pub async fn find(&self, user_id: Uuid) -> AppResult<Option<NotificationPreference>> {
        sqlx::query_as::<_, NotificationPreference>(
            "SELECT * FROM notification_preferences WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load preferences", e))
    }

    /// Insert or replace the preference record.
    pub async fn upsert(&self, prefs: &NotificationPreference) -> AppResult<NotificationPreference> {
        sqlx::query_as::<_, NotificationPreference>(
            "INSERT INTO notification_preferences (user_id, email_enabled, push_enabled, categories, updated_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET email_enabled = EXCLUDED.email_enabled, \
             push_enabled = EXCLUDED.push_enabled, categories = EXCLUDED.categories, \
             updated_at = EXCLUDED.updated_at RETURNING *",
        )
        .bind(prefs.user_id)
        .bind(prefs.email_enabled)
        .bind(prefs.push_enabled)
        .bind(&prefs.categories)
        .bind(prefs.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save preferences", e))
    }
}
