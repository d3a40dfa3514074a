//! Post, comment, like and report repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use busway_core::error::{AppError, ErrorKind};
use busway_core::result::AppResult;
use busway_core::types::pagination::{PageRequest, PageResponse};
use busway_entity::post::{
    Comment, CreatePost, Post, PostCategory, PostSort, ReportReason, UpdatePost, should_hide_post,
};

/// Default page size for post listings.
pub const DEFAULT_LIMIT: u32 = 10;

const POST_COLUMNS: &str = "p.*, u.name AS author_name";

/// Result of filing a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOutcome {
    /// Pending reports after this one.
    pub pending_reports: i64,
    /// Whether the post is hidden after this report.
    pub hidden: bool,
}

/// Repository for community content.
#[derive(Debug, Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Create a new post repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a post and bump the author's post counter.
    pub async fn create(&self, data: &CreatePost) -> AppResult<Post> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO posts (id, author_id, title, content, images, category, route_id, destination) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(id)
        .bind(data.author_id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(&data.images)
        .bind(data.category)
        .bind(data.route_id)
        .bind(&data.destination)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create post", e))?;

        sqlx::query("UPDATE users SET posts_count = posts_count + 1 WHERE id = $1")
            .bind(data.author_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to bump post count", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit post", e))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::internal("Created post vanished"))
    }

    /// Find a post that has not been deleted.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Post>> {
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id \
             WHERE p.id = $1 AND NOT p.is_deleted"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find post", e))
    }

    /// List visible posts.
    pub async fn list(
        &self,
        category: Option<PostCategory>,
        sort: PostSort,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Post>> {
        let limit = page.limit_or(DEFAULT_LIMIT);
        let order = match sort {
            PostSort::Newest => "p.created_at DESC",
            PostSort::Trending => "p.trending_score DESC, p.created_at DESC",
            PostSort::Popular => "p.likes_count DESC, p.created_at DESC",
        };

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts p WHERE NOT p.is_deleted AND NOT p.is_hidden \
             AND ($1::post_category IS NULL OR p.category = $1)",
        )
        .bind(category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count posts", e))?;

        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id \
             WHERE NOT p.is_deleted AND NOT p.is_hidden \
             AND ($1::post_category IS NULL OR p.category = $1) \
             ORDER BY {order} LIMIT $2 OFFSET $3"
        ))
        .bind(category)
        .bind(i64::from(limit))
        .bind(page.offset_for(DEFAULT_LIMIT))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list posts", e))?;

        Ok(PageResponse::new(posts, page.page(), limit, total))
    }

    /// Engagement figures of all visible posts, for trending recomputation.
    pub async fn engagement(&self) -> AppResult<Vec<(Uuid, i32, i32, DateTime<Utc>)>> {
        sqlx::query_as(
            "SELECT id, likes_count, comments_count, created_at FROM posts \
             WHERE NOT is_deleted AND NOT is_hidden",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load engagement", e))
    }

    /// Store recomputed trending scores in one statement.
    pub async fn store_trending_scores(&self, ids: &[Uuid], scores: &[f64]) -> AppResult<()> {
        sqlx::query(
            "UPDATE posts SET trending_score = s.score \
             FROM UNNEST($1::uuid[], $2::float8[]) AS s(id, score) WHERE posts.id = s.id",
        )
        .bind(ids)
        .bind(scores)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store scores", e))?;
        Ok(())
    }

    /// Top visible posts by stored trending score.
    pub async fn top_trending(&self, limit: i64) -> AppResult<Vec<Post>> {
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id \
             WHERE NOT p.is_deleted AND NOT p.is_hidden \
             ORDER BY p.trending_score DESC, p.created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list trending", e))
    }

    /// Update editable fields. `None` keeps the stored value.
    pub async fn update(&self, id: Uuid, data: &UpdatePost) -> AppResult<()> {
        sqlx::query(
            "UPDATE posts SET title = COALESCE($2, title), content = COALESCE($3, content), \
             category = COALESCE($4, category), updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.content)
        .bind(data.category)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update post", e))?;
        Ok(())
    }

    /// Soft-delete a post.
    pub async fn soft_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE posts SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete post", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a like and return the post's new like count.
    ///
    /// Returns `None` when the user already liked the post.
    pub async fn like(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        author_id: Uuid,
    ) -> AppResult<Option<i32>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let inserted = sqlx::query(
            "INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to like post", e))?
        .rows_affected()
            > 0;

        if !inserted {
            return Ok(None);
        }

        let likes: i32 = sqlx::query_scalar(
            "UPDATE posts SET likes_count = likes_count + 1 WHERE id = $1 RETURNING likes_count",
        )
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count like", e))?;
        sqlx::query("UPDATE users SET likes_received = likes_received + 1 WHERE id = $1")
            .bind(author_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count like", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit like", e))?;
        Ok(Some(likes))
    }

    /// Remove a like if there was one and return the post's like count.
    pub async fn unlike(&self, post_id: Uuid, user_id: Uuid, author_id: Uuid) -> AppResult<i32> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to unlike post", e))?
            .rows_affected()
            > 0;

        let likes: i32 = if removed {
            sqlx::query(
                "UPDATE users SET likes_received = GREATEST(likes_received - 1, 0) WHERE id = $1",
            )
            .bind(author_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unlike", e))?;
            sqlx::query_scalar(
                "UPDATE posts SET likes_count = GREATEST(likes_count - 1, 0) WHERE id = $1 \
                 RETURNING likes_count",
            )
            .bind(post_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unlike", e))?
        } else {
            sqlx::query_scalar("SELECT likes_count FROM posts WHERE id = $1")
                .bind(post_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read likes", e))?
        };

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit unlike", e))?;
        Ok(likes)
    }

    /// Add a comment and bump the post and author counters.
    pub async fn add_comment(&self, post_id: Uuid, author_id: Uuid, content: &str) -> AppResult<Comment> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (id, post_id, author_id, content) VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add comment", e))?;

        sqlx::query("UPDATE posts SET comments_count = comments_count + 1 WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count comment", e))?;
        sqlx::query("UPDATE users SET comments_count = comments_count + 1 WHERE id = $1")
            .bind(author_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count comment", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit comment", e))?;
        Ok(comment)
    }

    /// Comments of a post, newest first.
    pub async fn list_comments(&self, post_id: Uuid) -> AppResult<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            "SELECT c.*, u.name AS author_name FROM comments c JOIN users u ON u.id = c.author_id \
             WHERE c.post_id = $1 AND NOT c.is_deleted ORDER BY c.created_at DESC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list comments", e))
    }

    /// File a report and hide the post once enough reports are pending.
    ///
    /// Returns `None` when the reporter already reported this post.
    pub async fn report(
        &self,
        post_id: Uuid,
        reporter_id: Uuid,
        reason: ReportReason,
        description: Option<&str>,
    ) -> AppResult<Option<ReportOutcome>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let inserted = sqlx::query(
            "INSERT INTO post_reports (id, post_id, reporter_id, reason, description) \
             VALUES ($1, $2, $3, $4, $5) ON CONFLICT (post_id, reporter_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(reporter_id)
        .bind(reason)
        .bind(description)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to report post", e))?
        .rows_affected()
            > 0;

        if !inserted {
            return Ok(None);
        }

        sqlx::query("UPDATE posts SET reports_count = reports_count + 1 WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count report", e))?;

        let pending_reports: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM post_reports WHERE post_id = $1 AND status = 'pending'",
        )
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count reports", e))?;

        let hidden = should_hide_post(pending_reports);
        if hidden {
            sqlx::query("UPDATE posts SET is_hidden = TRUE, updated_at = NOW() WHERE id = $1")
                .bind(post_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to hide post", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit report", e))?;

        Ok(Some(ReportOutcome {
            pending_reports,
            hidden,
        }))
    }
}
