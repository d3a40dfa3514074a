//! Route reviews: creation gated on completed journeys, time-boxed edits,
//! community moderation and rating aggregation.

pub mod edit;
pub mod service;

pub use service::{CreateReviewRequest, ReviewService, UpdateReviewRequest};
