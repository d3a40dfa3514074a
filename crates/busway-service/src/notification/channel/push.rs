//! Push delivery through an HTTP push gateway.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use busway_core::config::PushConfig;
use busway_core::error::{AppError, ErrorKind};
use busway_entity::notification::DeliveryChannel;

use super::{DeliveryReport, DeliveryTransport};

/// HTTP request timeout for a single push.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for push delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("Push gateway returned HTTP {0}")]
    HttpStatus(u16),
}

/// Posts `{to, notification: {title, body}}` to the configured gateway.
pub struct PushGatewayTransport {
    client: reqwest::Client,
    endpoint: String,
    server_key: Option<String>,
}

impl PushGatewayTransport {
    /// Build the gateway client. Requires `endpoint` to be set.
    pub fn new(config: &PushConfig) -> Result<Self, AppError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| AppError::configuration("notification.push.endpoint is not set"))?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e))?;

        Ok(Self {
            client,
            endpoint,
            server_key: config.server_key.clone(),
        })
    }

    async fn deliver(&self, token: &str, title: &str, body: &str) -> Result<(), PushError> {
        let payload = serde_json::json!({
            "to": token,
            "notification": { "title": title, "body": body },
        });

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(key) = &self.server_key {
            request = request.header(reqwest::header::AUTHORIZATION, format!("key={key}"));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(PushError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl DeliveryTransport for PushGatewayTransport {
    fn channel(&self) -> DeliveryChannel {
        DeliveryChannel::Push
    }

    async fn send(&self, to: &str, title: &str, body: &str) -> DeliveryReport {
        match self.deliver(to, title, body).await {
            Ok(()) => {
                debug!(title, "Push notification sent");
                DeliveryReport::delivered()
            }
            Err(e) => {
                warn!(error = %e, "Push notification failed");
                DeliveryReport::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_error_display_http_status() {
        let err = PushError::HttpStatus(502);
        assert_eq!(err.to_string(), "Push gateway returned HTTP 502");
    }

    #[test]
    fn missing_endpoint_is_a_configuration_error() {
        assert!(PushGatewayTransport::new(&PushConfig::default()).is_err());
    }

    #[tokio::test]
    async fn unreachable_gateway_is_reported_not_raised() {
        let config = PushConfig {
            endpoint: Some("http://127.0.0.1:9/push".into()),
            server_key: None,
        };
        let transport = PushGatewayTransport::new(&config).unwrap();
        let report = transport.send("device-token", "Hi", "Body").await;
        assert!(!report.success);
        assert!(report.error.is_some());
    }
}
