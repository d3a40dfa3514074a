//! Post moderation reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Why content was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_reason", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ReportReason {
    /// Unsolicited advertising.
    Spam,
    /// Offensive content.
    Inappropriate,
    /// Targeted abuse.
    Harassment,
    /// Misleading claims.
    FalseInformation,
    /// Anything else.
    Other,
}

/// Moderator workflow state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Not yet looked at.
    Pending,
    /// Looked at.
    Reviewed,
    /// Acted upon.
    Resolved,
    /// Rejected.
    Dismissed,
}

/// A report filed against a post.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// Reported post.
    pub post_id: Uuid,
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
