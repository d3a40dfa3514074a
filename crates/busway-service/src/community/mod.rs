//! Community posts: publishing, engagement, comments and moderation reports.

pub mod service;
pub mod validation;

pub use service::{CreatePostRequest, PostService, UpdatePostRequest};
