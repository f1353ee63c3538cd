//! Scheduled job configuration.

use serde::{Deserialize, Serialize};

/// Cron schedules for the periodic control-plane jobs.
///
/// Six-field cron expressions (seconds first), as accepted by
/// `tokio-cron-scheduler`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Daily quota window reset — midnight.
    #[serde(default = "default_daily_reset")]
    pub daily_reset_cron: String,
    /// Weekly quota window reset — Monday midnight.
    #[serde(default = "default_weekly_reset")]
    pub weekly_reset_cron: String,
    /// Monthly quota window reset — 1st of the month, midnight.
    #[serde(default = "default_monthly_reset")]
    pub monthly_reset_cron: String,
    /// Alert evaluation sweep — hourly.
    #[serde(default = "default_alert_sweep")]
    pub alert_sweep_cron: String,
    /// Over-quota deprovisioning sweep — every 5 minutes.
    #[serde(default = "default_enforcement_sweep")]
    pub enforcement_sweep_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            daily_reset_cron: default_daily_reset(),
            weekly_reset_cron: default_weekly_reset(),
            monthly_reset_cron: default_monthly_reset(),
            alert_sweep_cron: default_alert_sweep(),
            enforcement_sweep_cron: default_enforcement_sweep(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_daily_reset() -> String {
    "0 0 0 * * *".to_string()
}

fn default_weekly_reset() -> String {
    "0 0 0 * * 1".to_string()
}

fn default_monthly_reset() -> String {
    "0 0 0 1 * *".to_string()
}

fn default_alert_sweep() -> String {
    "0 0 * * * *".to_string()
}

fn default_enforcement_sweep() -> String {
    "0 */5 * * * *".to_string()
}
