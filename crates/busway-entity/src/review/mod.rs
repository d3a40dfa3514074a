//! Route review entities and rules.

pub mod model;
pub mod rules;

pub use model::{CreateReview, Review, ReviewEdit, ReviewReport, ReviewSort};
pub use rules::{
    EDIT_WINDOW_HOURS, MAX_CONTENT_LEN, MIN_CONTENT_LEN, REVIEW_HIDE_THRESHOLD,
    RatingDistribution, RatingSummary, TRUSTED_UPVOTE_THRESHOLD, is_trusted_reviewer,
    should_hide_review, validate_content, validate_rating,
};
