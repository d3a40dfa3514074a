//! Directions provider configuration.

use serde::{Deserialize, Serialize};

/// Third-party directions API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    /// Directions endpoint URL.
    #[serde(default = "default_base_url")]
    pub directions_url: String,
    /// API key sent with each request.
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            directions_url: default_base_url(),
            api_key: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://maps.googleapis.com/maps/api/directions/json".to_string()
}

fn default_timeout() -> u64 {
    10
}
