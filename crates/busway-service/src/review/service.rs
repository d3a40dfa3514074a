//! Review service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use busway_core::error::AppError;
use busway_core::types::pagination::{PageRequest, PageResponse};
use busway_database::repositories::{BusRouteRepository, JourneyRepository, ReviewRepository};
use busway_entity::post::ReportReason;
use busway_entity::review::{
    CreateReview, RatingSummary, Review, ReviewSort, validate_content, validate_rating,
};

use super::edit::apply_edit;
use crate::context::RequestContext;

/// Request to review a route after a completed journey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    /// Reviewed route.
    pub route_id: Uuid,
    /// Journey the review is based on.
    pub journey_id: Uuid,
    /// Star rating, 1 to 5.
    pub rating: i16,
    /// Review text.
    pub content: String,
}

/// Request to edit a review.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateReviewRequest {
    /// New text.
    pub content: Option<String>,
    /// New rating.
    pub rating: Option<i16>,
}

/// Route review operations.
#[derive(Debug, Clone)]
pub struct ReviewService {
    review_repo: Arc<ReviewRepository>,
    journey_repo: Arc<JourneyRepository>,
    route_repo: Arc<BusRouteRepository>,
}

impl ReviewService {
    /// Creates a new review service.
    pub fn new(
        review_repo: Arc<ReviewRepository>,
        journey_repo: Arc<JourneyRepository>,
        route_repo: Arc<BusRouteRepository>,
    ) -> Self {
        Self {
            review_repo,
            journey_repo,
            route_repo,
        }
    }

    /// Reviews a route. The journey must be the caller's, completed,
    /// on this route and not yet reviewed.
    pub async fn create_review(
        &self,
        ctx: &RequestContext,
        req: CreateReviewRequest,
    ) -> Result<Review, AppError> {
        ctx.require_verified()?;
        validate_rating(req.rating)?;
        validate_content(&req.content)?;

        let journey = self
            .journey_repo
            .find_by_id(req.journey_id)
            .await?
            .ok_or_else(|| AppError::not_found("Journey not found"))?;
        if journey.has_reviewed {
            return Err(AppError::conflict("This journey has already been reviewed"));
        }
        if !journey.is_reviewable_by(ctx.user_id, req.route_id) {
            return Err(AppError::validation(
                "Reviews require a completed journey on this route",
            ));
        }
        if self.review_repo.exists_for(ctx.user_id, req.route_id).await? {
            return Err(AppError::conflict("You have already reviewed this route"));
        }

        let review = self
            .review_repo
            .create(
                &CreateReview {
                    user_id: ctx.user_id,
                    route_id: req.route_id,
                    journey_id: req.journey_id,
                    rating: req.rating,
                    content: req.content.trim().to_string(),
                },
                Utc::now(),
            )
            .await?;

        self.refresh_route_stats(review.route_id).await?;
        info!(review_id = %review.id, route_id = %review.route_id, "Review created");
        Ok(review)
    }

    /// Edits a review. Author only, within the edit window.
    pub async fn update_review(
        &self,
        ctx: &RequestContext,
        review_id: Uuid,
        req: UpdateReviewRequest,
    ) -> Result<Review, AppError> {
        let mut review = self.get_review(review_id).await?;
        if review.user_id != ctx.user_id {
            return Err(AppError::authorization("Not authorized to edit this review"));
        }

        let rating_changed = apply_edit(
            &mut review,
            req.content.as_deref(),
            req.rating,
            ctx.request_time,
        )?;
        self.review_repo.save_edit(&review).await?;
        if rating_changed {
            self.refresh_route_stats(review.route_id).await?;
        }
        info!(review_id = %review.id, rating_changed, "Review edited");
        Ok(review)
    }

    /// Deletes a review. Author or admin only.
    pub async fn delete_review(&self, ctx: &RequestContext, review_id: Uuid) -> Result<(), AppError> {
        let review = self.get_review(review_id).await?;
        if !ctx.can_modify(review.user_id) {
            return Err(AppError::authorization("Not authorized to delete this review"));
        }
        self.review_repo.delete(&review).await?;
        self.refresh_route_stats(review.route_id).await?;
        info!(review_id = %review.id, user_id = %ctx.user_id, "Review deleted");
        Ok(())
    }

    /// Lists visible reviews of a route.
    pub async fn list_route_reviews(
        &self,
        route_id: Uuid,
        sort: ReviewSort,
        page: PageRequest,
    ) -> Result<PageResponse<Review>, AppError> {
        self.review_repo.list_for_route(route_id, sort, &page).await
    }

    /// Upvotes a review.
    pub async fn upvote_review(
        &self,
        ctx: &RequestContext,
        review_id: Uuid,
    ) -> Result<Review, AppError> {
        self.get_review(review_id).await?;
        let review = self
            .review_repo
            .upvote(review_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::conflict("You have already upvoted this review"))?;
        if review.is_trusted_reviewer {
            info!(review_id = %review.id, upvotes = review.upvotes, "Trusted reviewer");
        }
        Ok(review)
    }

    /// Reports a review; stats are recomputed when it becomes hidden.
    pub async fn report_review(
        &self,
        ctx: &RequestContext,
        review_id: Uuid,
        reason: ReportReason,
        description: Option<&str>,
    ) -> Result<(), AppError> {
        let before = self.get_review(review_id).await?;
        let after = self
            .review_repo
            .report(review_id, ctx.user_id, reason, description)
            .await?
            .ok_or_else(|| AppError::conflict("You have already reported this review"))?;

        if after.is_hidden && !before.is_hidden {
            warn!(review_id = %review_id, reports = after.reports_count, "Review hidden after reports");
            self.refresh_route_stats(after.route_id).await?;
        }
        Ok(())
    }

    /// Rating summary of a route over its visible reviews.
    pub async fn route_stats(&self, route_id: Uuid) -> Result<RatingSummary, AppError> {
        let ratings = self.review_repo.visible_ratings(route_id).await?;
        Ok(RatingSummary::from_ratings(&ratings))
    }

    /// Clears the edit flag of reviews past their edit window.
    pub async fn lock_expired(&self, now: DateTime<Utc>, batch_size: i64) -> Result<u64, AppError> {
        self.review_repo.lock_expired(now, batch_size).await
    }

    async fn get_review(&self, review_id: Uuid) -> Result<Review, AppError> {
        self.review_repo
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| AppError::not_found("Review not found"))
    }

    async fn refresh_route_stats(&self, route_id: Uuid) -> Result<(), AppError> {
        let summary = self.route_stats(route_id).await?;
        self.route_repo.update_rating(route_id, &summary).await
    }
}
