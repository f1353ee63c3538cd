//! Profile entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use portal_core::types::QuotaWindow;

use super::quota::QuotaMode;

/// A reusable bandwidth/quota/session policy template.
///
/// Profiles are referenced by users (individual override) and promotions
/// (cohort default); they are soft-disabled via `active`, never deleted
/// while referenced.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    /// Unique profile identifier.
    pub id: Uuid,
    /// Unique profile name; also used as the AAA group name.
    pub name: String,
    /// Upload rate cap, e.g. `"2M"` (None = uncapped).
    pub upload_rate: Option<String>,
    /// Download rate cap, e.g. `"10M"` (None = uncapped).
    pub download_rate: Option<String>,
    /// Whether byte limits are enforced at all.
    pub quota_mode: QuotaMode,
    /// Daily byte limit (None = unlimited for this window).
    pub daily_limit: Option<i64>,
    /// Weekly byte limit (None = unlimited for this window).
    pub weekly_limit: Option<i64>,
    /// Monthly byte limit (None = unlimited for this window).
    pub monthly_limit: Option<i64>,
    /// Account validity duration in seconds (None = indefinite).
    pub validity_seconds: Option<i64>,
    /// AAA Session-Timeout in seconds (None = deployment default).
    pub session_timeout_seconds: Option<i64>,
    /// AAA Idle-Timeout in seconds (None = none).
    pub idle_timeout_seconds: Option<i64>,
    /// Maximum simultaneous sessions (None = unrestricted).
    pub max_sessions: Option<i32>,
    /// Soft-disable flag; inactive profiles drop out of resolution.
    pub active: bool,
    /// When the profile was created.
    pub created_at: DateTime<Utc>,
    /// When the profile was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// The byte limit for one quota window, or None when the window is
    /// unlimited (either by mode or by a missing limit).
    pub fn limit_for(&self, window: QuotaWindow) -> Option<i64> {
        if self.quota_mode == QuotaMode::Unlimited {
            return None;
        }
        match window {
            QuotaWindow::Daily => self.daily_limit,
            QuotaWindow::Weekly => self.weekly_limit,
            QuotaWindow::Monthly => self.monthly_limit,
        }
    }

    /// The AAA rate-limit string, `"<upload>/<download>"`, when either
    /// direction is capped.
    pub fn rate_limit_string(&self) -> Option<String> {
        match (&self.upload_rate, &self.download_rate) {
            (None, None) => None,
            (up, down) => Some(format!(
                "{}/{}",
                up.as_deref().unwrap_or("0"),
                down.as_deref().unwrap_or("0")
            )),
        }
    }
}

/// Data required to create a new profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfile {
    /// Unique profile name.
    pub name: String,
    /// Upload rate cap.
    pub upload_rate: Option<String>,
    /// Download rate cap.
    pub download_rate: Option<String>,
    /// Quota mode.
    pub quota_mode: QuotaMode,
    /// Daily byte limit.
    pub daily_limit: Option<i64>,
    /// Weekly byte limit.
    pub weekly_limit: Option<i64>,
    /// Monthly byte limit.
    pub monthly_limit: Option<i64>,
    /// Validity duration in seconds.
    pub validity_seconds: Option<i64>,
    /// Session timeout in seconds.
    pub session_timeout_seconds: Option<i64>,
    /// Idle timeout in seconds.
    pub idle_timeout_seconds: Option<i64>,
    /// Maximum simultaneous sessions.
    pub max_sessions: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            id: Uuid::new_v4(),
            name: "bronze".to_string(),
            upload_rate: Some("512k".to_string()),
            download_rate: Some("2M".to_string()),
            quota_mode: QuotaMode::Limited,
            daily_limit: Some(1_073_741_824),
            weekly_limit: None,
            monthly_limit: Some(21_474_836_480),
            validity_seconds: None,
            session_timeout_seconds: Some(7200),
            idle_timeout_seconds: None,
            max_sessions: Some(1),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_limit_for_respects_mode() {
        let mut p = profile();
        assert_eq!(
            p.limit_for(QuotaWindow::Daily),
            Some(1_073_741_824),
        );
        assert_eq!(p.limit_for(QuotaWindow::Weekly), None);

        p.quota_mode = QuotaMode::Unlimited;
        assert_eq!(p.limit_for(QuotaWindow::Daily), None);
        assert_eq!(p.limit_for(QuotaWindow::Monthly), None);
    }

    #[test]
    fn test_rate_limit_string() {
        let mut p = profile();
        assert_eq!(p.rate_limit_string().as_deref(), Some("512k/2M"));

        p.upload_rate = None;
        assert_eq!(p.rate_limit_string().as_deref(), Some("0/2M"));

        p.download_rate = None;
        assert_eq!(p.rate_limit_string(), None);
    }
}
