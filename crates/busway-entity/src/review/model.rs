//! Review models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::rules::EDIT_WINDOW_HOURS;
use crate::post::{ReportReason, ReportStatus};

/// Ordering for review listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSort {
    /// Newest first.
    #[default]
    Recent,
    /// Most upvoted first.
    Helpful,
    /// Highest rating first.
    Highest,
    /// Lowest rating first.
    Lowest,
}

/// A previous version of a review's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEdit {
    /// Content before the edit.
    pub content: String,
    /// When the edit happened.
    pub edited_at: DateTime<Utc>,
}

/// A rating of a bus route tied to a completed journey.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    /// Unique review identifier.
    pub id: Uuid,
    /// Author.
    pub user_id: Uuid,
    /// Author display name, when joined.
    #[sqlx(default)]
    pub author_name: Option<String>,
    /// Reviewed bus route.
    pub route_id: Uuid,
    /// Journey the review is based on.
    pub journey_id: Uuid,
    /// Star rating, 1 to 5.
    pub rating: i16,
    /// Review text.
    pub content: String,
    /// Whether the review was ever edited.
    pub edited: bool,
    /// Earlier versions of the text.
    pub edit_history: Json<Vec<ReviewEdit>>,
    /// Edit flag, cleared by the lock sweep.
    pub can_edit: bool,
    /// Edit deadline.
    pub editable_until: DateTime<Utc>,
    /// When the lock sweep cleared `can_edit`.
    pub locked_at: Option<DateTime<Utc>>,
    /// Reports received.
    pub reports_count: i32,
    /// Hidden by moderation.
    pub is_hidden: bool,
    /// Upvotes received.
    pub upvotes: i32,
    /// Author flagged as trusted through upvotes.
    pub is_trusted_reviewer: bool,
    /// When the review was created.
    pub created_at: DateTime<Utc>,
    /// When the review was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Edit deadline for a review created at `created_at`.
    pub fn deadline_from(created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at + Duration::hours(EDIT_WINDOW_HOURS)
    }

    /// Whether the author may still edit at `now`.
    ///
    /// The stored deadline decides; the flag only reflects sweeps already run.
    pub fn is_editable_at(&self, now: DateTime<Utc>) -> bool {
        self.can_edit && now < self.editable_until
    }
}

/// Data for a new review.
#[derive(Debug, Clone)]
pub struct CreateReview {
    /// Author.
    pub user_id: Uuid,
    /// Reviewed route.
    pub route_id: Uuid,
    /// Completed journey.
    pub journey_id: Uuid,
    /// Rating.
    pub rating: i16,
    /// Text.
    pub content: String,
}

/// A report filed against a review.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// Reported review.
    pub review_id: Uuid,
    /// Reporting user.
    pub reporter_id: Uuid,
    /// Reason.
    pub reason: ReportReason,
    /// Free-form description.
    pub description: Option<String>,
    /// Workflow state.
    pub status: ReportStatus,
    /// When the report was filed.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_created(at: DateTime<Utc>) -> Review {
        Review {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            author_name: None,
            route_id: Uuid::new_v4(),
            journey_id: Uuid::new_v4(),
            rating: 4,
            content: "x".repeat(60),
            edited: false,
            edit_history: Json(Vec::new()),
            can_edit: true,
            editable_until: Review::deadline_from(at),
            locked_at: None,
            reports_count: 0,
            is_hidden: false,
            upvotes: 0,
            is_trusted_reviewer: false,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn editable_inside_window() {
        let created = Utc::now();
        let review = review_created(created);
        assert!(review.is_editable_at(created + Duration::hours(23)));
    }

    #[test]
    fn deadline_wins_over_stale_flag() {
        let created = Utc::now();
        let review = review_created(created);
        assert!(review.can_edit);
        assert!(!review.is_editable_at(created + Duration::hours(24)));
        assert!(!review.is_editable_at(created + Duration::hours(30)));
    }

    #[test]
    fn locked_flag_blocks_edit() {
        let created = Utc::now();
        let mut review = review_created(created);
        review.can_edit = false;
        assert!(!review.is_editable_at(created + Duration::hours(1)));
    }
}
