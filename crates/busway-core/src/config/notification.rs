//! Notification delivery configuration.

use serde::{Deserialize, Serialize};

/// Which channels a retry re-attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetryScope {
    /// Only channels that have not been delivered yet.
    #[default]
    FailedOnly,
    /// Every channel that was attempted on the first dispatch.
    AllAttempted,
}

/// Dispatcher and transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Delay before a failed notification is retried.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: u64,
    /// Maximum number of retries per notification.
    #[serde(default = "default_max_retries")]
    pub max_retries: i32,
    /// Channel selection on retry.
    #[serde(default)]
    pub retry_scope: RetryScope,
    /// How long a claimed retry is held before another sweep may take it over.
    #[serde(default = "default_retry_lease")]
    pub retry_lease_seconds: u64,
    /// SMTP transport.
    #[serde(default)]
    pub email: EmailConfig,
    /// Push gateway transport.
    #[serde(default)]
    pub push: PushConfig,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            retry_delay_seconds: default_retry_delay(),
            max_retries: default_max_retries(),
            retry_scope: RetryScope::default(),
            retry_lease_seconds: default_retry_lease(),
            email: EmailConfig::default(),
            push: PushConfig::default(),
        }
    }
}

/// SMTP settings. Without a host, email delivery is only logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    #[serde(default)]
    pub smtp_host: Option<String>,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_user: Option<String>,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,
    /// `From` mailbox.
    #[serde(default = "default_from")]
    pub from_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_user: None,
            smtp_password: None,
            from_address: default_from(),
        }
    }
}

/// Push gateway settings. Without an endpoint, push delivery is only logged.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PushConfig {
    /// Gateway endpoint receiving `{to, notification: {title, body}}`.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Server key sent as the `Authorization` header.
    #[serde(default)]
    pub server_key: Option<String>,
}

fn default_retry_delay() -> u64 {
    60
}

fn default_retry_lease() -> u64 {
    300
}

fn default_max_retries() -> i32 {
    3
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from() -> String {
    "Busway <noreply@busway.local>".to_string()
}
