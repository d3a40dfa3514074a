//! Post moderation and ranking rules.

use chrono::{DateTime, Utc};

/// Pending reports at which a post is hidden.
pub const POST_HIDE_THRESHOLD: i64 = 5;

/// Whether a post with this many pending reports must be hidden.
pub fn should_hide_post(pending_reports: i64) -> bool {
    pending_reports >= POST_HIDE_THRESHOLD
}

/// Engagement per hour since creation; likes weigh double.
///
/// When no time has elapsed the raw engagement is returned.
pub fn trending_score(
    likes: i32,
    comments: i32,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> f64 {
    let engagement = f64::from(likes) * 2.0 + f64::from(comments);
    let hours = (now - created_at).num_milliseconds() as f64 / 3_600_000.0;
    if hours > 0.0 {
        engagement / hours
    } else {
        engagement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn fifth_report_hides() {
        assert!(!should_hide_post(4));
        assert!(should_hide_post(5));
        assert!(should_hide_post(6));
    }

    #[test]
    fn trending_divides_by_age_in_hours() {
        let now = Utc::now();
        let score = trending_score(10, 5, now - Duration::hours(5), now);
        assert!((score - 5.0).abs() < 1e-9);
    }

    #[test]
    fn trending_without_elapsed_time_is_raw() {
        let now = Utc::now();
        assert_eq!(trending_score(3, 1, now, now), 7.0);
        assert_eq!(trending_score(3, 1, now + Duration::minutes(1), now), 7.0);
    }
}
