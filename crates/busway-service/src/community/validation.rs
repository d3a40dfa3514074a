//! Input rules for posts and comments.

use busway_core::error::AppError;

/// Longest accepted post title.
pub const MAX_TITLE_LEN: usize = 200;
/// Longest accepted post body.
pub const MAX_CONTENT_LEN: usize = 5000;
/// Longest accepted comment.
pub const MAX_COMMENT_LEN: usize = 1000;

fn bounded(field: &str, value: &str, max: usize) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(AppError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

/// Trimmed post title.
pub fn post_title(title: &str) -> Result<String, AppError> {
    bounded("Title", title, MAX_TITLE_LEN)
}

/// Trimmed post body.
pub fn post_content(content: &str) -> Result<String, AppError> {
    bounded("Content", content, MAX_CONTENT_LEN)
}

/// Trimmed comment text.
pub fn comment_content(content: &str) -> Result<String, AppError> {
    bounded("Comment", content, MAX_COMMENT_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_is_trimmed() {
        assert_eq!(comment_content("  nice trip \n").unwrap(), "nice trip");
    }

    #[test]
    fn blank_comment_is_rejected() {
        let err = comment_content("   ").unwrap_err();
        assert_eq!(err.message, "Comment is required");
    }

    #[test]
    fn length_limits_count_characters() {
        assert!(comment_content(&"é".repeat(MAX_COMMENT_LEN)).is_ok());
        assert!(comment_content(&"é".repeat(MAX_COMMENT_LEN + 1)).is_err());
        assert!(post_title(&"a".repeat(MAX_TITLE_LEN + 1)).is_err());
        assert!(post_content(&"a".repeat(MAX_CONTENT_LEN)).is_ok());
    }
}
