//! Transport that only logs, used when a channel has no credentials.

use async_trait::async_trait;
use tracing::info;

use busway_entity::notification::DeliveryChannel;

use super::{DeliveryReport, DeliveryTransport};

/// Logs each message and reports success.
#[derive(Debug, Clone, Copy)]
pub struct LogTransport {
    channel: DeliveryChannel,
}

impl LogTransport {
    /// Create a logging transport for `channel`.
    pub fn new(channel: DeliveryChannel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl DeliveryTransport for LogTransport {
    fn channel(&self) -> DeliveryChannel {
        self.channel
    }

    async fn send(&self, to: &str, title: &str, _body: &str) -> DeliveryReport {
        info!(channel = %self.channel, to, title, "Notification delivered to log");
        DeliveryReport::delivered()
    }
}
