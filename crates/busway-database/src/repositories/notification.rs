//! Notification repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use busway_core::error::{AppError, ErrorKind};
use busway_core::result::AppResult;
use busway_core::types::pagination::{PageRequest, PageResponse};
use busway_entity::notification::{Notification, NotificationStatus};

/// Default page size for notification listings.
pub const DEFAULT_LIMIT: u32 = 20;

/// Repository for notification records.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a freshly built record.
    pub async fn insert(&self, n: &Notification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, user_id, notification_type, title, message, translations, \
             channels, status, email_sent, push_sent, email_error, push_error, retry_count, \
             next_attempt_at, is_read, read_at, related_id, related_type, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20) \
             RETURNING *",
        )
        .bind(n.id)
        .bind(n.user_id)
        .bind(n.notification_type)
        .bind(&n.title)
        .bind(&n.message)
        .bind(&n.translations)
        .bind(&n.channels)
        .bind(n.status)
        .bind(n.email_sent)
        .bind(n.push_sent)
        .bind(&n.email_error)
        .bind(&n.push_error)
        .bind(n.retry_count)
        .bind(n.next_attempt_at)
        .bind(n.is_read)
        .bind(n.read_at)
        .bind(n.related_id)
        .bind(n.related_type)
        .bind(n.created_at)
        .bind(n.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create notification", e))
    }

    /// Persist delivery state in place. Read state is owned by the user endpoints.
    pub async fn update_delivery(&self, n: &Notification) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET status = $2, email_sent = $3, push_sent = $4, \
             email_error = $5, push_error = $6, retry_count = $7, next_attempt_at = $8, \
             updated_at = $9 WHERE id = $1",
        )
        .bind(n.id)
        .bind(n.status)
        .bind(n.email_sent)
        .bind(n.push_sent)
        .bind(&n.email_error)
        .bind(&n.push_error)
        .bind(n.retry_count)
        .bind(n.next_attempt_at)
        .bind(n.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update notification", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Notification {} not found", n.id)));
        }
        Ok(())
    }

    /// Find a notification by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find notification", e))
    }

    /// List notifications for a user, newest first.
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let limit = page.limit_or(DEFAULT_LIMIT);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND (NOT $2 OR NOT is_read)",
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count notifications", e))?;

        let items = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 AND (NOT $2 OR NOT is_read) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(i64::from(limit))
        .bind(page.offset_for(DEFAULT_LIMIT))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))?;

        Ok(PageResponse::new(items, page.page(), limit, total))
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))
    }

    /// Find a notification owned by `user_id`.
    pub async fn find_owned(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find notification", e))
    }

    /// Persist read state. A concurrent earlier read keeps its `read_at`.
    pub async fn save_read(&self, n: &Notification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = $3, read_at = COALESCE(read_at, $4), \
             updated_at = CASE WHEN is_read THEN updated_at ELSE $5 END \
             WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(n.id)
        .bind(n.user_id)
        .bind(n.is_read)
        .bind(n.read_at)
        .bind(n.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?
        .ok_or_else(|| AppError::not_found("Notification not found"))
    }

    /// Mark every unread notification of a user as read.
    pub async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = $2, updated_at = $2 \
             WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }

    /// Claim due retries under a lease.
    ///
    /// Picks failed records past their deadline and `retrying` records whose
    /// lease expired. The same statement marks them `retrying`, moves
    /// `next_attempt_at` to `lease_until` and, for failed records only,
    /// consumes one retry. A sweep that dies mid-retry therefore leaves a
    /// record the next sweep picks up once the lease runs out.
    pub async fn claim_due_retries(
        &self,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET \
               retry_count = CASE WHEN status = $3 THEN retry_count + 1 ELSE retry_count END, \
               status = $4, next_attempt_at = $2, updated_at = $1 \
             WHERE id IN ( \
               SELECT id FROM notifications \
               WHERE next_attempt_at IS NOT NULL AND next_attempt_at <= $1 \
                 AND status IN ($3, $4) \
               ORDER BY next_attempt_at LIMIT $5 FOR UPDATE SKIP LOCKED \
             ) RETURNING *",
        )
        .bind(now)
        .bind(lease_until)
        .bind(NotificationStatus::Failed)
        .bind(NotificationStatus::Retrying)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim due retries", e))
    }
}
