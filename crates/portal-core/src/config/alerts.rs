//! Alert evaluation and delivery configuration.

use serde::{Deserialize, Serialize};

/// Settings for the alert evaluator and its notification channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Whether alert evaluation is enabled at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Endpoint for the webhook notification channel. Rules configured
    /// with the webhook channel fall back to the log channel when unset.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Webhook delivery timeout in seconds.
    #[serde(default = "default_webhook_timeout")]
    pub webhook_timeout_seconds: u64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            webhook_url: None,
            webhook_timeout_seconds: default_webhook_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_webhook_timeout() -> u64 {
    10
}
