//! Review validation, moderation thresholds and rating aggregation.

use busway_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Hours after creation during which a review can be edited.
pub const EDIT_WINDOW_HOURS: i64 = 24;
/// Reports at which a review is hidden.
pub const REVIEW_HIDE_THRESHOLD: i32 = 3;
/// Upvotes at which the author is flagged as a trusted reviewer.
pub const TRUSTED_UPVOTE_THRESHOLD: i32 = 10;
/// Minimum review length in characters.
pub const MIN_CONTENT_LEN: usize = 50;
/// Maximum review length in characters.
pub const MAX_CONTENT_LEN: usize = 2000;

/// Whether a review with this many reports must be hidden.
pub fn should_hide_review(reports: i32) -> bool {
    reports >= REVIEW_HIDE_THRESHOLD
}

/// Whether a review with this many upvotes marks its author as trusted.
pub fn is_trusted_reviewer(upvotes: i32) -> bool {
    upvotes >= TRUSTED_UPVOTE_THRESHOLD
}

/// Check a star rating.
pub fn validate_rating(rating: i16) -> AppResult<()> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::validation("Rating must be between 1 and 5"))
    }
}

/// Check review text length, counting characters rather than bytes.
pub fn validate_content(content: &str) -> AppResult<()> {
    let len = content.trim().chars().count();
    if len < MIN_CONTENT_LEN {
        return Err(AppError::validation(format!(
            "Review content must be at least {MIN_CONTENT_LEN} characters"
        )));
    }
    if len > MAX_CONTENT_LEN {
        return Err(AppError::validation(format!(
            "Review content must be at most {MAX_CONTENT_LEN} characters"
        )));
    }
    Ok(())
}

/// Count of reviews per star value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingDistribution {
    /// One star.
    #[serde(rename = "1")]
    pub one: i64,
    /// Two stars.
    #[serde(rename = "2")]
    pub two: i64,
    /// Three stars.
    #[serde(rename = "3")]
    pub three: i64,
    /// Four stars.
    #[serde(rename = "4")]
    pub four: i64,
    /// Five stars.
    #[serde(rename = "5")]
    pub five: i64,
}

impl RatingDistribution {
    fn bump(&mut self, rating: i16) {
        match rating {
            1 => self.one += 1,
            2 => self.two += 1,
            3 => self.three += 1,
            4 => self.four += 1,
            5 => self.five += 1,
            _ => {}
        }
    }
}

/// Aggregate rating of a route over its visible reviews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Mean rating, rounded to one decimal.
    pub average_rating: f64,
    /// Number of reviews counted.
    pub total_reviews: i64,
    /// Per-star counts.
    pub rating_distribution: RatingDistribution,
}

impl RatingSummary {
    /// Summarise a set of ratings. Out-of-range values are ignored.
    pub fn from_ratings(ratings: &[i16]) -> Self {
        let mut distribution = RatingDistribution::default();
        let mut total = 0i64;
        let mut sum = 0i64;
        for &rating in ratings.iter().filter(|r| (1..=5).contains(*r)) {
            distribution.bump(rating);
            total += 1;
            sum += i64::from(rating);
        }
        let average_rating = if total == 0 {
            0.0
        } else {
            (sum as f64 / total as f64 * 10.0).round() / 10.0
        };
        Self {
            average_rating,
            total_reviews: total,
            rating_distribution: distribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_rounds_to_one_decimal() {
        let summary = RatingSummary::from_ratings(&[5, 4, 4]);
        assert_eq!(summary.average_rating, 4.3);
        assert_eq!(summary.total_reviews, 3);
        assert_eq!(summary.rating_distribution.four, 2);
        assert_eq!(summary.rating_distribution.five, 1);
    }

    #[test]
    fn empty_summary_is_zero() {
        let summary = RatingSummary::from_ratings(&[]);
        assert_eq!(summary, RatingSummary::default());
    }

    #[test]
    fn distribution_serializes_with_star_keys() {
        let json = serde_json::to_value(RatingSummary::from_ratings(&[1, 5])).unwrap();
        assert_eq!(json["rating_distribution"]["1"], 1);
        assert_eq!(json["rating_distribution"]["5"], 1);
        assert_eq!(json["average_rating"], 3.0);
    }

    #[test]
    fn third_report_hides_review() {
        assert!(!should_hide_review(2));
        assert!(should_hide_review(3));
        assert!(should_hide_review(4));
    }

    #[test]
    fn tenth_upvote_marks_trusted() {
        assert!(!is_trusted_reviewer(9));
        assert!(is_trusted_reviewer(10));
        assert!(is_trusted_reviewer(25));
    }

    #[test]
    fn content_length_bounds() {
        assert!(validate_content(&"a".repeat(49)).is_err());
        assert!(validate_content(&"a".repeat(50)).is_ok());
        assert!(validate_content(&"a".repeat(2001)).is_err());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(5).is_ok());
    }
}
