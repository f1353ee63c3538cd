//! Alert notification channels.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use portal_core::config::alerts::AlertsConfig;
use portal_core::error::{AppError, ErrorKind};
use portal_core::AppResult;
use portal_entity::alert::{AlertChannel, TriggeredAlert};

/// Delivers triggered alerts over a rule's configured channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one alert. Failures are reported, not swallowed; the
    /// evaluator decides to log and continue.
    async fn deliver(&self, channel: AlertChannel, alert: &TriggeredAlert) -> AppResult<()>;
}

/// The standard notifier: structured log lines, plus an optional
/// webhook endpoint for rules on the webhook channel.
pub struct ChannelNotifier {
    /// Webhook client and endpoint, when configured.
    webhook: Option<(reqwest::Client, String)>,
}

impl std::fmt::Debug for ChannelNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelNotifier")
            .field("webhook_configured", &self.webhook.is_some())
            .finish()
    }
}

impl ChannelNotifier {
    /// Build from configuration.
    pub fn new(config: &AlertsConfig) -> AppResult<Self> {
        let webhook = match &config.webhook_url {
            Some(url) => {
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(config.webhook_timeout_seconds))
                    .build()
                    .map_err(|e| {
                        AppError::with_source(
                            ErrorKind::Notification,
                            "Failed to build webhook client",
                            e,
                        )
                    })?;
                Some((client, url.clone()))
            }
            None => None,
        };
        Ok(Self { webhook })
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn deliver(&self, channel: AlertChannel, alert: &TriggeredAlert) -> AppResult<()> {
        match channel {
            AlertChannel::Log => {
                warn!(
                    username = %alert.username,
                    window = %alert.window,
                    percent = alert.percent,
                    "{}", alert.message
                );
                Ok(())
            }
            AlertChannel::Webhook => match &self.webhook {
                Some((client, url)) => {
                    client
                        .post(url)
                        .json(alert)
                        .send()
                        .await
                        .and_then(|resp| resp.error_for_status())
                        .map_err(|e| {
                            AppError::with_source(
                                ErrorKind::Notification,
                                format!("Webhook delivery failed for '{}'", alert.username),
                                e,
                            )
                        })?;
                    Ok(())
                }
                None => {
                    // No endpoint configured; fall back to the log channel
                    // rather than dropping the alert.
                    warn!(
                        username = %alert.username,
                        window = %alert.window,
                        percent = alert.percent,
                        "{} (webhook channel unconfigured)", alert.message
                    );
                    Ok(())
                }
            },
        }
    }
}
