//! Usage ledger entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use portal_core::types::QuotaWindow;

/// Per-user rolling counters, one row per user.
///
/// Created lazily when a profile is first assigned; deactivated (never
/// deleted) when the profile is removed. Counters are mutated by
/// accounting ingestion and zeroed one window at a time by scheduled
/// resets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsageLedger {
    /// Unique ledger identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Bytes used since the last daily reset.
    pub used_today: i64,
    /// Bytes used since the last weekly reset.
    pub used_week: i64,
    /// Bytes used since the last monthly reset.
    pub used_month: i64,
    /// When the daily counter was last zeroed.
    pub last_daily_reset: DateTime<Utc>,
    /// When the weekly counter was last zeroed.
    pub last_weekly_reset: DateTime<Utc>,
    /// When the monthly counter was last zeroed.
    pub last_monthly_reset: DateTime<Utc>,
    /// Whether this ledger participates in resets and alerting.
    pub active: bool,
    /// When the ledger was created.
    pub created_at: DateTime<Utc>,
    /// When the ledger was last updated.
    pub updated_at: DateTime<Utc>,
}

impl UsageLedger {
    /// The counter for one window.
    pub fn used_in(&self, window: QuotaWindow) -> i64 {
        match window {
            QuotaWindow::Daily => self.used_today,
            QuotaWindow::Weekly => self.used_week,
            QuotaWindow::Monthly => self.used_month,
        }
    }

    /// The last-reset mark for one window.
    pub fn last_reset(&self, window: QuotaWindow) -> DateTime<Utc> {
        match window {
            QuotaWindow::Daily => self.last_daily_reset,
            QuotaWindow::Weekly => self.last_weekly_reset,
            QuotaWindow::Monthly => self.last_monthly_reset,
        }
    }

    /// Whether usage in a window meets or exceeds a limit.
    /// A `None` limit means the window is unlimited.
    pub fn exceeds(&self, window: QuotaWindow, limit: Option<i64>) -> bool {
        match limit {
            Some(limit) => self.used_in(window) >= limit,
            None => false,
        }
    }

    /// Current usage across all three windows.
    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            today: self.used_today,
            week: self.used_week,
            month: self.used_month,
        }
    }

    /// Add a byte total to every window whose last reset is at or before
    /// the record's timestamp. A record predating a window's reset
    /// boundary is not counted into that window again.
    ///
    /// `UsageRepository::add_usage` applies the same per-window rule in
    /// a single atomic UPDATE.
    pub fn apply_usage(&mut self, bytes: i64, recorded_at: DateTime<Utc>) {
        if recorded_at >= self.last_daily_reset {
            self.used_today += bytes;
        }
        if recorded_at >= self.last_weekly_reset {
            self.used_week += bytes;
        }
        if recorded_at >= self.last_monthly_reset {
            self.used_month += bytes;
        }
    }

    /// Zero one window's counter and stamp that window's reset mark.
    /// The other two counters and their marks are untouched.
    ///
    /// `UsageRepository::reset_window` applies the same rule across all
    /// active ledgers.
    pub fn apply_reset(&mut self, window: QuotaWindow, now: DateTime<Utc>) {
        match window {
            QuotaWindow::Daily => {
                self.used_today = 0;
                self.last_daily_reset = now;
            }
            QuotaWindow::Weekly => {
                self.used_week = 0;
                self.last_weekly_reset = now;
            }
            QuotaWindow::Monthly => {
                self.used_month = 0;
                self.last_monthly_reset = now;
            }
        }
    }

    /// Bring a ledger back into service. Scheduled resets skip inactive
    /// ledgers, so a ledger that sat inactive holds counters from a
    /// window that has since closed: it comes back zeroed with all three
    /// reset marks stamped now. An already active ledger is untouched.
    ///
    /// `UsageRepository::ensure_active` applies the same rule in its
    /// upsert.
    pub fn reactivate(&mut self, now: DateTime<Utc>) {
        if !self.active {
            self.used_today = 0;
            self.used_week = 0;
            self.used_month = 0;
            self.last_daily_reset = now;
            self.last_weekly_reset = now;
            self.last_monthly_reset = now;
            self.active = true;
        }
    }
}

/// Current usage across the three rolling windows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UsageSnapshot {
    /// Bytes used in the daily window.
    pub today: i64,
    /// Bytes used in the weekly window.
    pub week: i64,
    /// Bytes used in the monthly window.
    pub month: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> UsageLedger {
        let now = Utc::now();
        UsageLedger {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            used_today: 5_500_000_000,
            used_week: 6_000_000_000,
            used_month: 9_000_000_000,
            last_daily_reset: now,
            last_weekly_reset: now,
            last_monthly_reset: now,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_exceeds_five_gib_example() {
        // 5 GiB daily limit, 5.5 GB used
        let l = ledger();
        assert!(l.exceeds(QuotaWindow::Daily, Some(5_368_709_120)));
        assert!(!l.exceeds(QuotaWindow::Weekly, Some(6_000_000_001)));
        // exactly at the limit counts as exceeded
        assert!(l.exceeds(QuotaWindow::Weekly, Some(6_000_000_000)));
    }

    #[test]
    fn test_none_limit_never_exceeds() {
        let l = ledger();
        for window in QuotaWindow::ALL {
            assert!(!l.exceeds(window, None));
        }
    }

    #[test]
    fn test_usage_respects_reset_boundaries() {
        use chrono::Duration;

        let mut l = ledger();
        let now = Utc::now();
        // daily window reset an hour ago, weekly yesterday, monthly last week
        l.last_daily_reset = now - Duration::hours(1);
        l.last_weekly_reset = now - Duration::days(1);
        l.last_monthly_reset = now - Duration::days(7);
        let (today, week, month) = (l.used_today, l.used_week, l.used_month);

        // a record from before the daily reset counts into week and month only
        l.apply_usage(500, now - Duration::hours(2));
        assert_eq!(l.used_today, today);
        assert_eq!(l.used_week, week + 500);
        assert_eq!(l.used_month, month + 500);

        // a current record counts into all three
        l.apply_usage(100, now);
        assert_eq!(l.used_today, today + 100);
        assert_eq!(l.used_week, week + 600);
        assert_eq!(l.used_month, month + 600);

        // a record older than every reset mark counts nowhere
        l.apply_usage(999, now - Duration::days(30));
        assert_eq!(l.used_today, today + 100);
        assert_eq!(l.used_week, week + 600);
        assert_eq!(l.used_month, month + 600);
    }

    #[test]
    fn test_reset_touches_single_window() {
        use chrono::Duration;

        let mut l = ledger();
        let before = Utc::now() - Duration::days(1);
        l.last_daily_reset = before;
        l.last_weekly_reset = before;
        l.last_monthly_reset = before;

        let now = Utc::now();
        l.apply_reset(QuotaWindow::Daily, now);

        assert_eq!(l.used_today, 0);
        assert_eq!(l.last_daily_reset, now);
        // weekly and monthly counters and marks are unchanged
        assert_eq!(l.used_week, 6_000_000_000);
        assert_eq!(l.used_month, 9_000_000_000);
        assert_eq!(l.last_weekly_reset, before);
        assert_eq!(l.last_monthly_reset, before);
    }

    #[test]
    fn test_reactivation_starts_fresh() {
        use chrono::Duration;

        let mut l = ledger();
        l.active = false;
        let stale = Utc::now() - Duration::days(45);
        l.last_daily_reset = stale;
        l.last_weekly_reset = stale;
        l.last_monthly_reset = stale;

        let now = Utc::now();
        l.reactivate(now);

        assert!(l.active);
        assert_eq!(l.snapshot().today, 0);
        assert_eq!(l.snapshot().week, 0);
        assert_eq!(l.snapshot().month, 0);
        assert_eq!(l.last_daily_reset, now);
        assert_eq!(l.last_weekly_reset, now);
        assert_eq!(l.last_monthly_reset, now);
    }

    #[test]
    fn test_reactivation_leaves_active_ledger_untouched() {
        let mut l = ledger();
        let marks = (l.last_daily_reset, l.last_weekly_reset, l.last_monthly_reset);

        l.reactivate(Utc::now());

        assert!(l.active);
        assert_eq!(l.used_today, 5_500_000_000);
        assert_eq!(l.used_week, 6_000_000_000);
        assert_eq!(l.used_month, 9_000_000_000);
        assert_eq!(
            (l.last_daily_reset, l.last_weekly_reset, l.last_monthly_reset),
            marks
        );
    }
}
