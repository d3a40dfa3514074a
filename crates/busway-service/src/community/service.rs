//! Post service: CRUD, likes, comments, reports and trending ranking.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use busway_core::error::AppError;
use busway_core::types::pagination::{PageRequest, PageResponse};
use busway_database::repositories::PostRepository;
use busway_entity::notification::{DeliveryChannel, NewNotification, NotificationType, RelatedEntity};
use busway_entity::post::{
    Comment, CreatePost, Post, PostCategory, PostSort, ReportReason, UpdatePost, trending_score,
};

use super::validation::{comment_content, post_content, post_title};
use crate::context::RequestContext;
use crate::notification::NotificationDispatcher;

/// Number of posts on the trending list.
pub const TRENDING_LIMIT: i64 = 10;

/// Request to publish a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Category.
    pub category: PostCategory,
    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Related bus route.
    #[serde(default)]
    pub route_id: Option<Uuid>,
    /// Destination name.
    #[serde(default)]
    pub destination: Option<String>,
}

/// Request to edit a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    /// New title.
    pub title: Option<String>,
    /// New body text.
    pub content: Option<String>,
    /// New category.
    pub category: Option<PostCategory>,
}

/// Community post operations.
#[derive(Debug, Clone)]
pub struct PostService {
    /// Post repository.
    post_repo: Arc<PostRepository>,
    /// Notification dispatcher for likes and comments.
    dispatcher: Arc<NotificationDispatcher>,
}

impl PostService {
    /// Creates a new post service.
    pub fn new(post_repo: Arc<PostRepository>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self {
            post_repo,
            dispatcher,
        }
    }

    /// Publishes a post. Only verified users may post.
    pub async fn create_post(
        &self,
        ctx: &RequestContext,
        req: CreatePostRequest,
    ) -> Result<Post, AppError> {
        ctx.require_verified()?;
        let post = self
            .post_repo
            .create(&CreatePost {
                author_id: ctx.user_id,
                title: post_title(&req.title)?,
                content: post_content(&req.content)?,
                category: req.category,
                images: req.images,
                route_id: req.route_id,
                destination: req.destination,
            })
            .await?;
        info!(post_id = %post.id, author_id = %ctx.user_id, "Post created");
        Ok(post)
    }

    /// Lists visible posts.
    pub async fn list_posts(
        &self,
        category: Option<PostCategory>,
        sort: PostSort,
        page: PageRequest,
    ) -> Result<PageResponse<Post>, AppError> {
        self.post_repo.list(category, sort, &page).await
    }

    /// Recomputes trending scores and returns the top posts.
    pub async fn trending(&self) -> Result<Vec<Post>, AppError> {
        let now = Utc::now();
        let engagement = self.post_repo.engagement().await?;
        let (ids, scores): (Vec<Uuid>, Vec<f64>) = engagement
            .into_iter()
            .map(|(id, likes, comments, created_at)| {
                (id, trending_score(likes, comments, created_at, now))
            })
            .unzip();
        if !ids.is_empty() {
            self.post_repo.store_trending_scores(&ids, &scores).await?;
        }
        self.post_repo.top_trending(TRENDING_LIMIT).await
    }

    /// Gets a post by ID.
    pub async fn get_post(&self, post_id: Uuid) -> Result<Post, AppError> {
        self.post_repo
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post not found"))
    }

    /// Edits a post. Author or admin only.
    pub async fn update_post(
        &self,
        ctx: &RequestContext,
        post_id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<Post, AppError> {
        let post = self.get_post(post_id).await?;
        if !ctx.can_modify(post.author_id) {
            return Err(AppError::authorization("Not authorized to edit this post"));
        }

        let update = UpdatePost {
            title: req.title.as_deref().map(post_title).transpose()?,
            content: req.content.as_deref().map(post_content).transpose()?,
            category: req.category,
        };
        self.post_repo.update(post_id, &update).await?;
        info!(post_id = %post_id, user_id = %ctx.user_id, "Post updated");
        self.get_post(post_id).await
    }

    /// Soft-deletes a post. Author or admin only.
    pub async fn delete_post(&self, ctx: &RequestContext, post_id: Uuid) -> Result<(), AppError> {
        let post = self.get_post(post_id).await?;
        if !ctx.can_modify(post.author_id) {
            return Err(AppError::authorization("Not authorized to delete this post"));
        }
        self.post_repo.soft_delete(post_id).await?;
        info!(post_id = %post_id, user_id = %ctx.user_id, "Post deleted");
        Ok(())
    }

    /// Likes a post and notifies its author. Returns the new like count.
    pub async fn like_post(&self, ctx: &RequestContext, post_id: Uuid) -> Result<i32, AppError> {
        let post = self.get_post(post_id).await?;
        let likes = self
            .post_repo
            .like(post_id, ctx.user_id, post.author_id)
            .await?
            .ok_or_else(|| AppError::conflict("Post already liked"))?;

        if post.author_id != ctx.user_id {
            self.dispatcher.dispatch_detached(NewNotification {
                user_id: post.author_id,
                notification_type: NotificationType::PostLike,
                title: "New like".to_string(),
                message: format!("{} liked your post \"{}\"", ctx.name, post.title),
                channels: vec![DeliveryChannel::Email, DeliveryChannel::Push],
                related_id: Some(post.id),
                related_type: Some(RelatedEntity::Post),
                translations: None,
            });
        }
        Ok(likes)
    }

    /// Removes a like if there was one. Returns the resulting like count.
    pub async fn unlike_post(&self, ctx: &RequestContext, post_id: Uuid) -> Result<i32, AppError> {
        let post = self.get_post(post_id).await?;
        self.post_repo
            .unlike(post_id, ctx.user_id, post.author_id)
            .await
    }

    /// Comments on a post and notifies its author.
    pub async fn add_comment(
        &self,
        ctx: &RequestContext,
        post_id: Uuid,
        content: &str,
    ) -> Result<Comment, AppError> {
        let content = comment_content(content)?;
        let post = self.get_post(post_id).await?;
        let mut comment = self
            .post_repo
            .add_comment(post_id, ctx.user_id, &content)
            .await?;
        comment.author_name = Some(ctx.name.clone());

        if post.author_id != ctx.user_id {
            self.dispatcher.dispatch_detached(NewNotification {
                user_id: post.author_id,
                notification_type: NotificationType::PostComment,
                title: "New comment".to_string(),
                message: format!("{} commented on your post \"{}\"", ctx.name, post.title),
                channels: vec![DeliveryChannel::Email, DeliveryChannel::Push],
                related_id: Some(post.id),
                related_type: Some(RelatedEntity::Post),
                translations: None,
            });
        }
        Ok(comment)
    }

    /// Lists comments of a post, newest first.
    pub async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, AppError> {
        self.get_post(post_id).await?;
        self.post_repo.list_comments(post_id).await
    }

    /// Reports a post. The post is hidden once enough reports are pending.
    pub async fn report_post(
        &self,
        ctx: &RequestContext,
        post_id: Uuid,
        reason: ReportReason,
        description: Option<&str>,
    ) -> Result<(), AppError> {
        self.get_post(post_id).await?;
        let outcome = self
            .post_repo
            .report(post_id, ctx.user_id, reason, description)
            .await?
            .ok_or_else(|| AppError::conflict("You have already reported this post"))?;

        if outcome.hidden {
            warn!(
                post_id = %post_id,
                pending_reports = outcome.pending_reports,
                "Post hidden after reports"
            );
        }
        Ok(())
    }
}
