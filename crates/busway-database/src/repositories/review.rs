//! Review repository: reviews, upvotes, reports and rating inputs.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use busway_core::error::{AppError, ErrorKind};
use busway_core::result::AppResult;
use busway_core::types::pagination::{PageRequest, PageResponse};
use busway_entity::post::ReportReason;
use busway_entity::review::{
    CreateReview, Review, ReviewSort, is_trusted_reviewer, should_hide_review,
};

/// Default page size for review listings.
pub const DEFAULT_LIMIT: u32 = 10;

/// Repository for route reviews.
#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    /// Create a new review repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a review and mark its journey as reviewed.
    ///
    /// A second review of the same route by the same user is a conflict.
    pub async fn create(&self, data: &CreateReview, now: DateTime<Utc>) -> AppResult<Review> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let review = sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (id, user_id, route_id, journey_id, rating, content, editable_until, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.route_id)
        .bind(data.journey_id)
        .bind(data.rating)
        .bind(&data.content)
        .bind(Review::deadline_from(now))
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::conflict("You have already reviewed this route")
            }
            other => AppError::with_source(ErrorKind::Database, "Failed to create review", other),
        })?;

        sqlx::query(
            "UPDATE journeys SET has_reviewed = TRUE, review_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(data.journey_id)
        .bind(review.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to link journey", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit review", e))?;
        Ok(review)
    }

    /// Find a review by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Review>> {
        sqlx::query_as::<_, Review>(
            "SELECT r.*, u.name AS author_name FROM reviews r JOIN users u ON u.id = r.user_id \
             WHERE r.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find review", e))
    }

    /// Whether the user already reviewed the route.
    pub async fn exists_for(&self, user_id: Uuid, route_id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE user_id = $1 AND route_id = $2)",
        )
        .bind(user_id)
        .bind(route_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check review", e))
    }

    /// Visible reviews of a route.
    pub async fn list_for_route(
        &self,
        route_id: Uuid,
        sort: ReviewSort,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Review>> {
        let limit = page.limit_or(DEFAULT_LIMIT);
        let order = match sort {
            ReviewSort::Recent => "r.created_at DESC",
            ReviewSort::Helpful => "r.upvotes DESC, r.created_at DESC",
            ReviewSort::Highest => "r.rating DESC, r.created_at DESC",
            ReviewSort::Lowest => "r.rating ASC, r.created_at DESC",
        };

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reviews WHERE route_id = $1 AND NOT is_hidden",
        )
        .bind(route_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count reviews", e))?;

        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT r.*, u.name AS author_name FROM reviews r JOIN users u ON u.id = r.user_id \
             WHERE r.route_id = $1 AND NOT r.is_hidden ORDER BY {order} LIMIT $2 OFFSET $3"
        ))
        .bind(route_id)
        .bind(i64::from(limit))
        .bind(page.offset_for(DEFAULT_LIMIT))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list reviews", e))?;

        Ok(PageResponse::new(reviews, page.page(), limit, total))
    }

    /// Persist an edit made by the author.
    pub async fn save_edit(&self, review: &Review) -> AppResult<()> {
        sqlx::query(
            "UPDATE reviews SET rating = $2, content = $3, edited = $4, edit_history = $5, \
             updated_at = $6 WHERE id = $1",
        )
        .bind(review.id)
        .bind(review.rating)
        .bind(&review.content)
        .bind(review.edited)
        .bind(&review.edit_history)
        .bind(review.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save review", e))?;
        Ok(())
    }

    /// Delete a review and release its journey for a new review.
    pub async fn delete(&self, review: &Review) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete review", e))?;

        sqlx::query(
            "UPDATE journeys SET has_reviewed = FALSE, review_id = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(review.journey_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to release journey", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit delete", e))?;
        Ok(())
    }

    /// Record an upvote and flag trusted reviewers.
    ///
    /// Returns `None` when the user already upvoted.
    pub async fn upvote(&self, review_id: Uuid, user_id: Uuid) -> AppResult<Option<Review>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let inserted = sqlx::query(
            "INSERT INTO review_upvotes (review_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(review_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upvote", e))?
        .rows_affected()
            > 0;

        if !inserted {
            return Ok(None);
        }

        let mut review = sqlx::query_as::<_, Review>(
            "UPDATE reviews SET upvotes = upvotes + 1, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(review_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count upvote", e))?;

        if is_trusted_reviewer(review.upvotes) && !review.is_trusted_reviewer {
            review = sqlx::query_as::<_, Review>(
                "UPDATE reviews SET is_trusted_reviewer = TRUE WHERE id = $1 RETURNING *",
            )
            .bind(review_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to flag reviewer", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit upvote", e))?;
        Ok(Some(review))
    }

    /// File a report and hide the review at the threshold.
    ///
    /// Returns `None` when the reporter already reported this review.
    pub async fn report(
        &self,
        review_id: Uuid,
        reporter_id: Uuid,
        reason: ReportReason,
        description: Option<&str>,
    ) -> AppResult<Option<Review>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let inserted = sqlx::query(
            "INSERT INTO review_reports (id, review_id, reporter_id, reason, description) \
             VALUES ($1, $2, $3, $4, $5) ON CONFLICT (review_id, reporter_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(review_id)
        .bind(reporter_id)
        .bind(reason)
        .bind(description)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to report review", e))?
        .rows_affected()
            > 0;

        if !inserted {
            return Ok(None);
        }

        let mut review = sqlx::query_as::<_, Review>(
            "UPDATE reviews SET reports_count = reports_count + 1, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(review_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count report", e))?;

        if should_hide_review(review.reports_count) && !review.is_hidden {
            review = sqlx::query_as::<_, Review>(
                "UPDATE reviews SET is_hidden = TRUE WHERE id = $1 RETURNING *",
            )
            .bind(review_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to hide review", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit report", e))?;
        Ok(Some(review))
    }

    /// Ratings of the visible reviews of a route.
    pub async fn visible_ratings(&self, route_id: Uuid) -> AppResult<Vec<i16>> {
        sqlx::query_scalar("SELECT rating FROM reviews WHERE route_id = $1 AND NOT is_hidden")
            .bind(route_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load ratings", e))
    }

    /// Clear `can_edit` on reviews whose edit window has closed.
    pub async fn lock_expired(&self, now: DateTime<Utc>, limit: i64) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE reviews SET can_edit = FALSE, locked_at = $1 \
             WHERE id IN (SELECT id FROM reviews WHERE can_edit AND editable_until <= $1 \
             ORDER BY editable_until LIMIT $2 FOR UPDATE SKIP LOCKED)",
        )
        .bind(now)
        .bind(limit)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock reviews", e))?;
        Ok(result.rows_affected())
    }
}
