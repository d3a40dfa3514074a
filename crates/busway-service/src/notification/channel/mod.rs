//! Delivery transports.
//!
//! A transport never returns an error: every failure is folded into a
//! [`DeliveryReport`] so the dispatcher can record it per channel.

pub mod email;
pub mod log;
pub mod push;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use busway_core::config::NotificationConfig;
use busway_core::error::AppError;
use busway_entity::notification::DeliveryChannel;

pub use email::SmtpTransport;
pub use log::LogTransport;
pub use push::PushGatewayTransport;

/// Outcome of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Whether the transport accepted the message.
    pub success: bool,
    /// Transport error when it did not.
    pub error: Option<String>,
}

impl DeliveryReport {
    /// A successful delivery.
    pub fn delivered() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed delivery.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }

    /// The error to record, `None` on success.
    pub fn into_error(self) -> Option<String> {
        if self.success {
            None
        } else {
            Some(self.error.unwrap_or_else(|| "delivery failed".to_string()))
        }
    }
}

/// Sends a titled message to one address over one channel.
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    /// The channel this transport serves.
    fn channel(&self) -> DeliveryChannel;

    /// Send `title`/`body` to `to`.
    async fn send(&self, to: &str, title: &str, body: &str) -> DeliveryReport;
}

/// Email and push transports built from configuration.
///
/// A channel without configured credentials falls back to [`LogTransport`].
pub fn build_transports(
    config: &NotificationConfig,
) -> Result<(Arc<dyn DeliveryTransport>, Arc<dyn DeliveryTransport>), AppError> {
    let email: Arc<dyn DeliveryTransport> = match config.email.smtp_host {
        Some(_) => Arc::new(SmtpTransport::new(&config.email)?),
        None => {
            info!("SMTP host not configured, email notifications will only be logged");
            Arc::new(LogTransport::new(DeliveryChannel::Email))
        }
    };

    let push: Arc<dyn DeliveryTransport> = match config.push.endpoint {
        Some(_) => Arc::new(PushGatewayTransport::new(&config.push)?),
        None => {
            info!("Push endpoint not configured, push notifications will only be logged");
            Arc::new(LogTransport::new(DeliveryChannel::Push))
        }
    };

    Ok((email, push))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_error_defaults_when_missing() {
        let report = DeliveryReport {
            success: false,
            error: None,
        };
        assert_eq!(report.into_error().as_deref(), Some("delivery failed"));
        assert!(DeliveryReport::delivered().into_error().is_none());
    }

    #[test]
    fn unconfigured_transports_fall_back_to_logging() {
        let (email, push) = build_transports(&NotificationConfig::default()).unwrap();
        assert_eq!(email.channel(), DeliveryChannel::Email);
        assert_eq!(push.channel(), DeliveryChannel::Push);
    }
}
