//! Delivery channel enumeration.

use serde::{Deserialize, Serialize};

/// Transport a notification can be delivered over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "delivery_channel", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    /// SMTP email.
    Email,
    /// Mobile push.
    Push,
}

impl DeliveryChannel {
    /// Return the channel as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Push => "push",
        }
    }

    /// Collapse duplicates and order channels email first, then push.
    pub fn normalize(channels: &[DeliveryChannel]) -> Vec<DeliveryChannel> {
        let mut out = channels.to_vec();
        out.sort();
        out.dedup();
        out
    }
}

impl std::fmt::Display for DeliveryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_dedups_and_orders() {
        let channels = [
            DeliveryChannel::Push,
            DeliveryChannel::Email,
            DeliveryChannel::Push,
        ];
        assert_eq!(
            DeliveryChannel::normalize(&channels),
            vec![DeliveryChannel::Email, DeliveryChannel::Push]
        );
        assert!(DeliveryChannel::normalize(&[]).is_empty());
    }
}
