//! Post and comment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Board a post belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "post_category", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PostCategory {
    /// Discussion of bus routes.
    Routes,
    /// Destinations worth visiting.
    Destinations,
    /// General travel tips.
    TravelTips,
}

/// Ordering for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    /// Most recent first.
    #[default]
    Newest,
    /// Highest trending score first.
    Trending,
    /// Most liked first.
    Popular,
}

/// A community post.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    /// Unique post identifier.
    pub id: Uuid,
    /// Author.
    pub author_id: Uuid,
    /// Author display name, when joined.
    #[sqlx(default)]
    pub author_name: Option<String>,
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Image URLs.
    pub images: Vec<String>,
    /// Board.
    pub category: PostCategory,
    /// Bus route discussed, if any.
    pub route_id: Option<Uuid>,
    /// Destination discussed, if any.
    pub destination: Option<String>,
    /// Likes received.
    pub likes_count: i32,
    /// Comments received.
    pub comments_count: i32,
    /// Reports received.
    pub reports_count: i32,
    /// Hidden by moderation.
    pub is_hidden: bool,
    /// Soft-deleted.
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    /// Last computed trending score.
    pub trending_score: f64,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
    /// When the post was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Whether the post shows up in listings.
    pub fn is_visible(&self) -> bool {
        !self.is_hidden && !self.is_deleted
    }
}

/// Data for a new post.
#[derive(Debug, Clone)]
pub struct CreatePost {
    /// Author.
    pub author_id: Uuid,
    /// Title.
    pub title: String,
    /// Body.
    pub content: String,
    /// Board.
    pub category: PostCategory,
    /// Image URLs.
    pub images: Vec<String>,
    /// Bus route discussed.
    pub route_id: Option<Uuid>,
    /// Destination discussed.
    pub destination: Option<String>,
}

/// Editable post fields.
#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    /// New title.
    pub title: Option<String>,
    /// New body.
    pub content: Option<String>,
    /// New board.
    pub category: Option<PostCategory>,
}

/// A comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    /// Unique comment identifier.
    pub id: Uuid,
    /// Parent post.
    pub post_id: Uuid,
    /// Author.
    pub author_id: Uuid,
    /// Author display name, when joined.
    #[sqlx(default)]
    pub author_name: Option<String>,
    /// Comment text.
    pub content: String,
    /// Soft-deleted.
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    /// When the comment was created.
    pub created_at: DateTime<Utc>,
}
