//! In-place review edits.

use chrono::{DateTime, Utc};

use busway_core::error::AppError;
use busway_entity::review::{Review, ReviewEdit, validate_content, validate_rating};

/// Apply an edit to `review` at `now`.
///
/// The previous content is pushed onto the edit history before anything
/// changes. Returns whether the rating changed.
pub fn apply_edit(
    review: &mut Review,
    content: Option<&str>,
    rating: Option<i16>,
    now: DateTime<Utc>,
) -> Result<bool, AppError> {
    if !review.is_editable_at(now) {
        return Err(AppError::authorization(
            "Review cannot be edited after 24 hours",
        ));
    }
    if let Some(content) = content {
        validate_content(content)?;
    }
    if let Some(rating) = rating {
        validate_rating(rating)?;
    }

    review.edit_history.0.push(ReviewEdit {
        content: review.content.clone(),
        edited_at: now,
    });
    if let Some(content) = content {
        review.content = content.trim().to_string();
    }
    let rating_changed = rating.is_some_and(|r| r != review.rating);
    if let Some(rating) = rating {
        review.rating = rating;
    }
    review.edited = true;
    review.updated_at = now;
    Ok(rating_changed)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use sqlx::types::Json;
    use uuid::Uuid;

    use super::*;

    fn review(created_at: DateTime<Utc>) -> Review {
        Review {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            author_name: None,
            route_id: Uuid::new_v4(),
            journey_id: Uuid::new_v4(),
            rating: 3,
            content: "The bus left on time and the seats were comfortable enough.".into(),
            edited: false,
            edit_history: Json(Vec::new()),
            can_edit: true,
            editable_until: Review::deadline_from(created_at),
            locked_at: None,
            reports_count: 0,
            is_hidden: false,
            upvotes: 0,
            is_trusted_reviewer: false,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn edit_keeps_previous_content_in_history() {
        let created = Utc::now();
        let mut r = review(created);
        let original = r.content.clone();
        let new_text = "Driver was friendly, but the air conditioning broke halfway there.";

        let changed = apply_edit(&mut r, Some(new_text), Some(3), created + Duration::hours(2)).unwrap();

        assert!(!changed);
        assert!(r.edited);
        assert_eq!(r.content, new_text);
        assert_eq!(r.edit_history.0.len(), 1);
        assert_eq!(r.edit_history.0[0].content, original);
    }

    #[test]
    fn rating_change_is_reported() {
        let created = Utc::now();
        let mut r = review(created);
        assert!(apply_edit(&mut r, None, Some(5), created + Duration::minutes(1)).unwrap());
        assert_eq!(r.rating, 5);
    }

    #[test]
    fn edit_at_deadline_is_rejected_even_if_flag_is_set() {
        let created = Utc::now();
        let mut r = review(created);
        assert!(r.can_edit);
        let deadline = r.editable_until;
        let err = apply_edit(&mut r, None, Some(4), deadline).unwrap_err();
        assert_eq!(err.kind, busway_core::error::ErrorKind::Authorization);
        assert!(r.edit_history.0.is_empty());
        assert_eq!(r.rating, 3);
    }

    #[test]
    fn short_content_is_rejected_without_side_effects() {
        let created = Utc::now();
        let mut r = review(created);
        assert!(apply_edit(&mut r, Some("too short"), None, created).is_err());
        assert!(!r.edited);
        assert!(r.edit_history.0.is_empty());
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let created = Utc::now();
        let mut r = review(created);
        assert!(apply_edit(&mut r, None, Some(6), created).is_err());
    }
}
