//! Request DTOs with validation.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use busway_core::types::pagination::PageRequest;
use busway_entity::journey::JourneyStatus;
use busway_entity::notification::{
    ChannelTogglePatch, DeliveryChannel, LocalizedText, NewNotification, NotificationType,
    PreferenceGroup, PreferencePatch, RelatedEntity,
};
use busway_entity::post::{PostCategory, PostSort, ReportReason};
use busway_entity::review::ReviewSort;
use busway_entity::user::Theme;
use busway_service::community::{CreatePostRequest, UpdatePostRequest};
use busway_service::planning::PlanRequest;
use busway_service::review::{CreateReviewRequest, UpdateReviewRequest};
use busway_service::user::UpdateProfileRequest;

// ── Auth ─────────────────────────────────────────────────────────

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    /// Email address.
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Email verification request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    /// Token from the verification email.
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

// ── Users ────────────────────────────────────────────────────────

/// Profile update request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileBody {
    /// Display name.
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// Bio.
    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,
    /// Profile picture URL.
    #[validate(url)]
    pub profile_picture: Option<String>,
}

impl From<UpdateProfileBody> for UpdateProfileRequest {
    fn from(body: UpdateProfileBody) -> Self {
        Self {
            name: body.name,
            bio: body.bio,
            profile_picture: body.profile_picture,
        }
    }
}

/// Language change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LanguageRequest {
    /// Locale code such as `en` or `fr`.
    #[validate(length(min = 2, max = 10, message = "Invalid language code"))]
    pub language: String,
}

/// Theme change request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeRequest {
    /// New theme.
    pub theme: Theme,
}

/// Push token registration. A missing or empty token unregisters the device.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PushTokenRequest {
    /// Device token.
    #[serde(default)]
    #[validate(length(max = 512))]
    pub token: Option<String>,
}

// ── Posts ────────────────────────────────────────────────────────

/// Post listing query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostListQuery {
    /// Only posts of this category.
    pub category: Option<PostCategory>,
    /// Ordering.
    #[serde(default)]
    pub sort: PostSort,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

impl PostListQuery {
    /// Paging part of the query.
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// New post body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostBody {
    /// Title.
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    /// Body text.
    #[validate(length(min = 1, max = 5000, message = "Content must be 1 to 5000 characters"))]
    pub content: String,
    /// Category.
    pub category: PostCategory,
    /// Image URLs.
    #[serde(default)]
    pub images: Vec<String>,
    /// Related bus route.
    #[serde(default)]
    pub route_id: Option<Uuid>,
    /// Destination name.
    #[serde(default)]
    pub destination: Option<String>,
}

impl From<CreatePostBody> for CreatePostRequest {
    fn from(body: CreatePostBody) -> Self {
        Self {
            title: body.title,
            content: body.content,
            category: body.category,
            images: body.images,
            route_id: body.route_id,
            destination: body.destination,
        }
    }
}

/// Post edit body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePostBody {
    /// New title.
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// New body text.
    #[validate(length(min = 1, max = 5000))]
    pub content: Option<String>,
    /// New category.
    pub category: Option<PostCategory>,
}

impl From<UpdatePostBody> for UpdatePostRequest {
    fn from(body: UpdatePostBody) -> Self {
        Self {
            title: body.title,
            content: body.content,
            category: body.category,
        }
    }
}

/// New comment body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CommentRequest {
    /// Comment text.
    #[validate(length(min = 1, max = 1000, message = "Comment must be 1 to 1000 characters"))]
    pub content: String,
}

/// Report body for posts and reviews.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportRequest {
    /// Reason.
    pub reason: ReportReason,
    /// Free-form details.
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

// ── Reviews ──────────────────────────────────────────────────────

/// New review body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReviewBody {
    /// Reviewed route.
    pub route_id: Uuid,
    /// Completed journey on that route.
    pub journey_id: Uuid,
    /// Star rating.
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,
    /// Review text.
    #[validate(length(min = 50, max = 2000, message = "Review must be 50 to 2000 characters"))]
    pub content: String,
}

impl From<CreateReviewBody> for CreateReviewRequest {
    fn from(body: CreateReviewBody) -> Self {
        Self {
            route_id: body.route_id,
            journey_id: body.journey_id,
            rating: body.rating,
            content: body.content,
        }
    }
}

/// Review edit body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateReviewBody {
    /// New rating.
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<i16>,
    /// New text.
    #[validate(length(min = 50, max = 2000))]
    pub content: Option<String>,
}

impl From<UpdateReviewBody> for UpdateReviewRequest {
    fn from(body: UpdateReviewBody) -> Self {
        Self {
            content: body.content,
            rating: body.rating,
        }
    }
}

/// Review listing query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewListQuery {
    /// Ordering.
    #[serde(default)]
    pub sort: ReviewSort,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

impl ReviewListQuery {
    /// Paging part of the query.
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            limit: self.limit,
        }
    }
}

// ── Notifications ────────────────────────────────────────────────

/// Notification inbox query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationListQuery {
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
    /// Only unread notifications.
    #[serde(default)]
    pub unread_only: bool,
}

impl NotificationListQuery {
    /// Paging part of the query.
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page,
            limit: self.limit,
        }
    }
}

/// Partial preference update. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePreferencesRequest {
    /// Global email switch.
    #[serde(default)]
    pub email_enabled: Option<bool>,
    /// Global push switch.
    #[serde(default)]
    pub push_enabled: Option<bool>,
    /// Per-group toggles, keyed by group name.
    #[serde(default)]
    pub categories: HashMap<PreferenceGroup, ChannelTogglePatch>,
}

impl From<UpdatePreferencesRequest> for PreferencePatch {
    fn from(body: UpdatePreferencesRequest) -> Self {
        Self {
            email_enabled: body.email_enabled,
            push_enabled: body.push_enabled,
            categories: body.categories.into_iter().collect(),
        }
    }
}

/// Admin request to notify a user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendNotificationRequest {
    /// Recipient.
    pub user_id: Uuid,
    /// Notification type.
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// Title.
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    /// Message.
    #[validate(length(min = 1, max = 2000, message = "Message is required"))]
    pub message: String,
    /// Channels to deliver over.
    #[serde(default)]
    pub channels: Vec<DeliveryChannel>,
    /// Related entity identifier.
    #[serde(default)]
    pub related_id: Option<Uuid>,
    /// Related entity kind.
    #[serde(default)]
    pub related_type: Option<RelatedEntity>,
    /// Translations keyed by locale.
    #[serde(default)]
    pub translations: Option<BTreeMap<String, LocalizedText>>,
}

impl From<SendNotificationRequest> for NewNotification {
    fn from(body: SendNotificationRequest) -> Self {
        Self {
            user_id: body.user_id,
            notification_type: body.notification_type,
            title: body.title,
            message: body.message,
            channels: body.channels,
            related_id: body.related_id,
            related_type: body.related_type,
            translations: body.translations,
        }
    }
}

// ── Route planning ───────────────────────────────────────────────

/// Candidate trips to compare.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompareRoutesRequest {
    /// At least two candidates.
    #[validate(length(min = 2, message = "At least two routes are required"))]
    pub routes: Vec<PlanRequest>,
}

// ── Admin ────────────────────────────────────────────────────────

/// Journey status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyStatusRequest {
    /// New status.
    pub status: JourneyStatus,
}

/// Journey departure change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleRequest {
    /// New departure.
    pub scheduled_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_rejects_bad_email() {
        let req = RegisterRequest {
            name: "Ada".into(),
            email: "not-an-email".into(),
            password: "secret1".into(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn review_rating_must_be_in_range() {
        let req = CreateReviewBody {
            route_id: Uuid::new_v4(),
            journey_id: Uuid::new_v4(),
            rating: 6,
            content: "Clean bus, friendly driver.".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn preference_patch_keeps_every_group() {
        let body: UpdatePreferencesRequest = serde_json::from_value(serde_json::json!({
            "push_enabled": false,
            "categories": {
                "promotion": { "email": true },
                "social": { "push": false }
            }
        }))
        .unwrap();

        let patch = PreferencePatch::from(body);
        assert_eq!(patch.push_enabled, Some(false));
        assert_eq!(patch.email_enabled, None);
        assert_eq!(patch.categories.len(), 2);
    }

    #[test]
    fn comparison_needs_two_candidates() {
        let req = CompareRoutesRequest { routes: vec![] };
        assert!(req.validate().is_err());
    }

    #[test]
    fn admin_notification_uses_type_key() {
        let body: SendNotificationRequest = serde_json::from_value(serde_json::json!({
            "user_id": Uuid::nil(),
            "type": "journey-reminder",
            "title": "Reminder",
            "message": "Your bus leaves soon",
            "channels": ["push"]
        }))
        .unwrap();
        let request = NewNotification::from(body);
        assert_eq!(request.notification_type, NotificationType::JourneyReminder);
        assert_eq!(request.channels, vec![DeliveryChannel::Push]);
    }
}
