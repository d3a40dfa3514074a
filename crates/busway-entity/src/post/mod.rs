//! Community post entities and moderation rules.

pub mod model;
pub mod report;
pub mod rules;

pub use model::{Comment, CreatePost, Post, PostCategory, PostSort, UpdatePost};
pub use report::{PostReport, ReportReason, ReportStatus};
pub use rules::{POST_HIDE_THRESHOLD, should_hide_post, trending_score};
