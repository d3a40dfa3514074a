//! Notification preference entity and resolution rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use super::category::{NotificationType, PreferenceGroup};
use super::channel::DeliveryChannel;

/// Email/push switches for one preference group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelToggle {
    /// Deliver by email.
    pub email: bool,
    /// Deliver by push.
    pub push: bool,
}

impl ChannelToggle {
    const ON: Self = Self {
        email: true,
        push: true,
    };
    const OFF: Self = Self {
        email: false,
        push: false,
    };

    fn allows(&self, channel: DeliveryChannel) -> bool {
        match channel {
            DeliveryChannel::Email => self.email,
            DeliveryChannel::Push => self.push,
        }
    }
}

fn on() -> ChannelToggle {
    ChannelToggle::ON
}

fn off() -> ChannelToggle {
    ChannelToggle::OFF
}

/// Per-group toggles. Missing groups fall back to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPreferences {
    /// Booking confirmations.
    #[serde(default = "on")]
    pub booking_confirmation: ChannelToggle,
    /// Cancellations.
    #[serde(default = "on")]
    pub cancellation: ChannelToggle,
    /// Schedule changes.
    #[serde(default = "on")]
    pub schedule_change: ChannelToggle,
    /// Journey reminders.
    #[serde(default = "on")]
    pub journey_reminder: ChannelToggle,
    /// Promotions, opt-in.
    #[serde(default = "off")]
    pub promotion: ChannelToggle,
    /// Likes, comments and review responses.
    #[serde(default = "on")]
    pub social: ChannelToggle,
}

impl Default for CategoryPreferences {
    fn default() -> Self {
        Self {
            booking_confirmation: ChannelToggle::ON,
            cancellation: ChannelToggle::ON,
            schedule_change: ChannelToggle::ON,
            journey_reminder: ChannelToggle::ON,
            promotion: ChannelToggle::OFF,
            social: ChannelToggle::ON,
        }
    }
}

impl CategoryPreferences {
    /// Toggles for one group.
    pub fn group(&self, group: PreferenceGroup) -> ChannelToggle {
        match group {
            PreferenceGroup::BookingConfirmation => self.booking_confirmation,
            PreferenceGroup::Cancellation => self.cancellation,
            PreferenceGroup::ScheduleChange => self.schedule_change,
            PreferenceGroup::JourneyReminder => self.journey_reminder,
            PreferenceGroup::Promotion => self.promotion,
            PreferenceGroup::Social => self.social,
        }
    }

    fn group_mut(&mut self, group: PreferenceGroup) -> &mut ChannelToggle {
        match group {
            PreferenceGroup::BookingConfirmation => &mut self.booking_confirmation,
            PreferenceGroup::Cancellation => &mut self.cancellation,
            PreferenceGroup::ScheduleChange => &mut self.schedule_change,
            PreferenceGroup::JourneyReminder => &mut self.journey_reminder,
            PreferenceGroup::Promotion => &mut self.promotion,
            PreferenceGroup::Social => &mut self.social,
        }
    }
}

/// Per-user notification delivery preferences.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationPreference {
    /// The user these preferences belong to.
    pub user_id: Uuid,
    /// Global email switch.
    pub email_enabled: bool,
    /// Global push switch.
    pub push_enabled: bool,
    /// Per-group switches.
    pub categories: Json<CategoryPreferences>,
    /// When preferences were last updated.
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a single group's toggles.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ChannelTogglePatch {
    /// New email value.
    #[serde(default)]
    pub email: Option<bool>,
    /// New push value.
    #[serde(default)]
    pub push: Option<bool>,
}

/// Partial update of a preference record. Unspecified fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferencePatch {
    /// New global email switch.
    #[serde(default)]
    pub email_enabled: Option<bool>,
    /// New global push switch.
    #[serde(default)]
    pub push_enabled: Option<bool>,
    /// Group updates.
    #[serde(default)]
    pub categories: Vec<(PreferenceGroup, ChannelTogglePatch)>,
}

impl NotificationPreference {
    /// The record a user without stored preferences is treated as having.
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            email_enabled: true,
            push_enabled: true,
            categories: Json(CategoryPreferences::default()),
            updated_at: Utc::now(),
        }
    }

    /// Whether the user accepts `notification_type` over `channel`.
    ///
    /// Both the global switch and the group switch must be on.
    pub fn allows(&self, notification_type: NotificationType, channel: DeliveryChannel) -> bool {
        let global = match channel {
            DeliveryChannel::Email => self.email_enabled,
            DeliveryChannel::Push => self.push_enabled,
        };
        global && self.categories.group(notification_type.group()).allows(channel)
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, patch: &PreferencePatch) {
        if let Some(email) = patch.email_enabled {
            self.email_enabled = email;
        }
        if let Some(push) = patch.push_enabled {
            self.push_enabled = push;
        }
        for (group, toggle) in &patch.categories {
            let current = self.categories.group_mut(*group);
            if let Some(email) = toggle.email {
                current.email = email;
            }
            if let Some(push) = toggle.push {
                current.push = push;
            }
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_disable_only_promotions() {
        let prefs = NotificationPreference::defaults_for(Uuid::new_v4());
        for ty in NotificationType::ALL {
            for ch in [DeliveryChannel::Email, DeliveryChannel::Push] {
                let expected = ty != NotificationType::Promotion;
                assert_eq!(prefs.allows(ty, ch), expected, "{ty} over {ch}");
            }
        }
    }

    #[test]
    fn global_switch_overrides_group() {
        let mut prefs = NotificationPreference::defaults_for(Uuid::new_v4());
        prefs.apply(&PreferencePatch {
            email_enabled: Some(false),
            ..Default::default()
        });
        assert!(!prefs.allows(NotificationType::Cancellation, DeliveryChannel::Email));
        assert!(prefs.allows(NotificationType::Cancellation, DeliveryChannel::Push));
    }

    #[test]
    fn patch_leaves_unspecified_fields() {
        let mut prefs = NotificationPreference::defaults_for(Uuid::new_v4());
        prefs.apply(&PreferencePatch {
            categories: vec![(
                PreferenceGroup::Promotion,
                ChannelTogglePatch {
                    email: Some(true),
                    push: None,
                },
            )],
            ..Default::default()
        });
        assert!(prefs.allows(NotificationType::Promotion, DeliveryChannel::Email));
        assert!(!prefs.allows(NotificationType::Promotion, DeliveryChannel::Push));
        assert!(prefs.email_enabled);
    }

    #[test]
    fn stored_json_missing_groups_use_defaults() {
        let parsed: CategoryPreferences =
            serde_json::from_str(r#"{"social": {"email": false, "push": true}}"#).unwrap();
        assert!(!parsed.social.email);
        assert!(parsed.booking_confirmation.email);
        assert!(!parsed.promotion.push);
    }
}
