//! User repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use busway_core::error::{AppError, ErrorKind};
use busway_core::result::AppResult;
use busway_core::types::pagination::{PageRequest, PageResponse};
use busway_entity::user::{CreateUser, Theme, User, UserRole, UserStats};

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    /// Find a user by (lower-cased) email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    /// Insert a new user. A duplicate email is a conflict.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, role) \
             VALUES ($1, $2, LOWER($3), $4, $5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::conflict("User already exists with this email")
            }
            other => AppError::with_source(ErrorKind::Database, "Failed to create user", other),
        })
    }

    /// Mark the email address as verified.
    pub async fn mark_verified(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET is_verified = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to verify user", e))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Update profile fields. `None` keeps the stored value.
    pub async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        bio: Option<&str>,
        profile_picture: Option<&str>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET name = COALESCE($2, name), bio = COALESCE($3, bio), \
             profile_picture = COALESCE($4, profile_picture), updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(bio)
        .bind(profile_picture)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update profile", e))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Set the preferred language.
    pub async fn set_language(&self, id: Uuid, language: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET language = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(language)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set language", e))?;
        Ok(())
    }

    /// Set the preferred theme.
    pub async fn set_theme(&self, id: Uuid, theme: Theme) -> AppResult<()> {
        sqlx::query("UPDATE users SET theme = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(theme)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set theme", e))?;
        Ok(())
    }

    /// Register or clear the push device token.
    pub async fn set_push_token(&self, id: Uuid, token: Option<&str>) -> AppResult<()> {
        sqlx::query("UPDATE users SET push_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to set push token", e)
            })?;
        Ok(())
    }

    /// Change a user's role.
    pub async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set role", e))?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// List users, newest first.
    pub async fn list(&self, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let limit = page.limit_or(20);
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(limit))
        .bind(page.offset_for(20))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?;

        Ok(PageResponse::new(users, page.page(), limit, total))
    }

    /// Live activity counters for the profile page.
    pub async fn stats(&self, id: Uuid) -> AppResult<UserStats> {
        sqlx::query_as::<_, UserStats>(
            "SELECT \
               (SELECT COUNT(*) FROM posts WHERE author_id = $1 AND NOT is_deleted) AS posts_count, \
               (SELECT COUNT(*) FROM comments WHERE author_id = $1 AND NOT is_deleted) AS comments_count, \
               COALESCE((SELECT likes_received::BIGINT FROM users WHERE id = $1), 0) AS likes_received",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load user stats", e))
    }
}
