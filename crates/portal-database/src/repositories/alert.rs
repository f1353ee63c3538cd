//! Alert rule and firing repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_entity::alert::AlertRule;

/// Repository for alert rules and their per-user firing memory.
#[derive(Debug, Clone)]
pub struct AlertRepository {
    pool: PgPool,
}

impl AlertRepository {
    /// Create a new alert repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All active rules, grouped by owning profile in the result order.
    pub async fn find_active_rules(&self) -> AppResult<Vec<AlertRule>> {
        sqlx::query_as::<_, AlertRule>(
            "SELECT * FROM alert_rules WHERE active = TRUE \
             ORDER BY profile_id, threshold_percent DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list alert rules", e))
    }

    /// Create a new rule.
    pub async fn create_rule(
        &self,
        profile_id: Uuid,
        window: portal_core::types::QuotaWindow,
        threshold_percent: i16,
        channel: portal_entity::alert::AlertChannel,
        message_template: &str,
    ) -> AppResult<AlertRule> {
        sqlx::query_as::<_, AlertRule>(
            "INSERT INTO alert_rules (profile_id, window_kind, threshold_percent, channel, message_template) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(profile_id)
        .bind(window)
        .bind(threshold_percent)
        .bind(channel)
        .bind(message_template)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create alert rule", e))
    }

    /// When a rule last fired for a user, if ever.
    pub async fn last_fired(
        &self,
        user_id: Uuid,
        rule_id: Uuid,
    ) -> AppResult<Option<DateTime<Utc>>> {
        sqlx::query_scalar(
            "SELECT fired_at FROM alert_firings WHERE user_id = $1 AND rule_id = $2",
        )
        .bind(user_id)
        .bind(rule_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read last firing", e))
    }

    /// Record that a rule fired for a user now.
    pub async fn record_firing(&self, user_id: Uuid, rule_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO alert_firings (user_id, rule_id, fired_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (user_id, rule_id) DO UPDATE SET fired_at = NOW()",
        )
        .bind(user_id)
        .bind(rule_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record firing", e))?;
        Ok(())
    }
}
