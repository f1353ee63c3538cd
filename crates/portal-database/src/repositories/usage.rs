//! Usage ledger repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_core::types::QuotaWindow;
use portal_entity::usage::UsageLedger;
use portal_entity::user::User;

/// Repository for per-user rolling usage counters.
#[derive(Debug, Clone)]
pub struct UsageRepository {
    pool: PgPool,
}

impl UsageRepository {
    /// Create a new usage repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the ledger for one user.
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<UsageLedger>> {
        sqlx::query_as::<_, UsageLedger>("SELECT * FROM usage_ledgers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find ledger", e))
    }

    /// Create the ledger for a user if none exists, and (re)activate it.
    ///
    /// Called lazily when a profile is first assigned. Scheduled resets
    /// skip inactive ledgers, so a ledger coming back from inactive
    /// starts fresh: counters zeroed, all three reset marks stamped now.
    /// An already active ledger is left untouched.
    pub async fn ensure_active(&self, user_id: Uuid) -> AppResult<UsageLedger> {
        sqlx::query_as::<_, UsageLedger>(
            "INSERT INTO usage_ledgers (user_id) VALUES ($1) \
             ON CONFLICT ON CONSTRAINT usage_ledgers_user_key \
             DO UPDATE SET \
                active = TRUE, \
                used_today = CASE WHEN usage_ledgers.active THEN usage_ledgers.used_today ELSE 0 END, \
                used_week  = CASE WHEN usage_ledgers.active THEN usage_ledgers.used_week  ELSE 0 END, \
                used_month = CASE WHEN usage_ledgers.active THEN usage_ledgers.used_month ELSE 0 END, \
                last_daily_reset   = CASE WHEN usage_ledgers.active THEN usage_ledgers.last_daily_reset   ELSE NOW() END, \
                last_weekly_reset  = CASE WHEN usage_ledgers.active THEN usage_ledgers.last_weekly_reset  ELSE NOW() END, \
                last_monthly_reset = CASE WHEN usage_ledgers.active THEN usage_ledgers.last_monthly_reset ELSE NOW() END, \
                updated_at = NOW() \
             RETURNING *",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to ensure ledger", e))
    }

    /// Deactivate a user's ledger (kept, never deleted).
    pub async fn deactivate(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE usage_ledgers SET active = FALSE, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to deactivate ledger", e))?;
        Ok(())
    }

    /// Add a combined byte total to every window whose last reset is at or
    /// before the record's timestamp.
    ///
    /// One atomic UPDATE; a record predating a window's reset boundary is
    /// not counted into that window again.
    pub async fn add_usage(
        &self,
        user_id: Uuid,
        bytes: i64,
        recorded_at: DateTime<Utc>,
    ) -> AppResult<UsageLedger> {
        sqlx::query_as::<_, UsageLedger>(
            "UPDATE usage_ledgers SET \
                used_today = used_today + CASE WHEN $3 >= last_daily_reset THEN $2 ELSE 0 END, \
                used_week  = used_week  + CASE WHEN $3 >= last_weekly_reset THEN $2 ELSE 0 END, \
                used_month = used_month + CASE WHEN $3 >= last_monthly_reset THEN $2 ELSE 0 END, \
                updated_at = NOW() \
             WHERE user_id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(bytes)
        .bind(recorded_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add usage", e))?
        .ok_or_else(|| AppError::not_found(format!("No usage ledger for user {user_id}")))
    }

    /// Zero one window's counter across all active ledgers and stamp that
    /// window's last-reset mark. The other two windows are untouched.
    ///
    /// Returns the number of ledger rows reset.
    pub async fn reset_window(&self, window: QuotaWindow) -> AppResult<u64> {
        let sql = match window {
            QuotaWindow::Daily => {
                "UPDATE usage_ledgers SET used_today = 0, last_daily_reset = NOW(), \
                 updated_at = NOW() WHERE active = TRUE"
            }
            QuotaWindow::Weekly => {
                "UPDATE usage_ledgers SET used_week = 0, last_weekly_reset = NOW(), \
                 updated_at = NOW() WHERE active = TRUE"
            }
            QuotaWindow::Monthly => {
                "UPDATE usage_ledgers SET used_month = 0, last_monthly_reset = NOW(), \
                 updated_at = NOW() WHERE active = TRUE"
            }
        };

        let result = sqlx::query(sql).execute(&self.pool).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to reset {window} window"),
                e,
            )
        })?;

        Ok(result.rows_affected())
    }

    /// All active ledgers joined with their owning users, for exceeded
    /// queries and alert sweeps.
    pub async fn find_active_with_users(&self) -> AppResult<Vec<(UsageLedger, User)>> {
        let ledgers = sqlx::query_as::<_, UsageLedger>(
            "SELECT * FROM usage_ledgers WHERE active = TRUE ORDER BY user_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list active ledgers", e)
        })?;

        let users = sqlx::query_as::<_, User>(
            "SELECT u.* FROM users u \
             JOIN usage_ledgers l ON l.user_id = u.id \
             WHERE l.active = TRUE ORDER BY u.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list ledger users", e)
        })?;

        // Pair each ledger with its owner by user id.
        let mut pairs = Vec::with_capacity(ledgers.len());
        let mut users_by_id: std::collections::HashMap<Uuid, User> =
            users.into_iter().map(|u| (u.id, u)).collect();
        for ledger in ledgers {
            if let Some(user) = users_by_id.remove(&ledger.user_id) {
                pairs.push((ledger, user));
            }
        }
        Ok(pairs)
    }
}
