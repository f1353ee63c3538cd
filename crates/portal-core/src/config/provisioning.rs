//! AAA provisioning configuration.

use serde::{Deserialize, Serialize};

/// Settings for writing user entries into the AAA tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    /// Session timeout (seconds) applied when the effective profile does
    /// not define one.
    #[serde(default = "default_session_timeout")]
    pub default_session_timeout_seconds: i64,
    /// Group name used when the effective profile is the unlimited default.
    #[serde(default = "default_group")]
    pub default_group: String,
    /// Upper bound on waiting for a user's row lock, in milliseconds.
    /// Keeps a concurrent activate/deactivate pair from stalling forever.
    #[serde(default = "default_lock_wait")]
    pub lock_wait_timeout_ms: u64,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            default_session_timeout_seconds: default_session_timeout(),
            default_group: default_group(),
            lock_wait_timeout_ms: default_lock_wait(),
        }
    }
}

fn default_session_timeout() -> i64 {
    3600
}

fn default_group() -> String {
    "portal-users".to_string()
}

fn default_lock_wait() -> u64 {
    5_000
}
