//! Alert rule and triggered alert models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use portal_core::types::QuotaWindow;

/// Delivery channel for a triggered alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "alert_channel", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AlertChannel {
    /// Structured log line only.
    Log,
    /// HTTP POST to the configured webhook endpoint.
    Webhook,
}

impl AlertChannel {
    /// Return the channel as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Webhook => "webhook",
        }
    }
}

impl fmt::Display for AlertChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertChannel {
    type Err = portal_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "webhook" => Ok(Self::Webhook),
            _ => Err(portal_core::AppError::validation(format!(
                "Invalid alert channel: '{s}'. Expected one of: log, webhook"
            ))),
        }
    }
}

/// A threshold definition owned by a profile.
///
/// Evaluated read-only by the alert sweep; fires at most once per
/// ledger window per user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AlertRule {
    /// Unique rule identifier.
    pub id: Uuid,
    /// Owning profile.
    pub profile_id: Uuid,
    /// Which window the threshold applies to.
    #[sqlx(rename = "window_kind")]
    pub window: QuotaWindow,
    /// Percentage of the window limit that triggers the alert (1–100).
    pub threshold_percent: i16,
    /// Delivery channel.
    pub channel: AlertChannel,
    /// Message template with `{username}`, `{threshold}`, `{percent}`,
    /// `{used}`, `{limit}`, `{remaining}` placeholders.
    pub message_template: String,
    /// Whether the rule is evaluated.
    pub active: bool,
    /// When the rule was created.
    pub created_at: DateTime<Utc>,
}

/// One alert emitted by an evaluation sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggeredAlert {
    /// The user who crossed the threshold.
    pub user_id: Uuid,
    /// The user's login name.
    pub username: String,
    /// The rule that fired.
    pub rule_id: Uuid,
    /// The window the rule watches.
    pub window: QuotaWindow,
    /// Integer percentage of the limit consumed at evaluation time.
    pub percent: u64,
    /// The rendered notification message.
    pub message: String,
}
