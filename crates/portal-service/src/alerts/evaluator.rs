//! Periodic alert rule evaluation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use portal_core::AppResult;
use portal_database::repositories::alert::AlertRepository;
use portal_database::repositories::usage::UsageRepository;
use portal_entity::alert::{AlertRule, TriggeredAlert};
use portal_entity::usage::UsageLedger;

use crate::resolver::ProfileResolver;

use super::notifier::Notifier;
use super::template::{self, TemplateValues};

/// Integer percentage of a limit consumed. Limits are validated > 0.
fn percent_of(used: i64, limit: i64) -> u64 {
    if limit <= 0 {
        return 0;
    }
    (used.max(0) as u64).saturating_mul(100) / (limit as u64)
}

/// A rule already fired for this ledger window when its stored firing
/// timestamp is at or after the window's last reset.
fn already_fired(last_fired: Option<DateTime<Utc>>, window_reset: DateTime<Utc>) -> bool {
    last_fired.is_some_and(|fired| fired >= window_reset)
}

/// Watches ledger state against profile-defined thresholds and emits
/// at-most-once-per-window notifications.
pub struct AlertEvaluator {
    /// Alert rule and firing repository.
    alert_repo: Arc<AlertRepository>,
    /// Usage ledger repository.
    usage_repo: Arc<UsageRepository>,
    /// Effective-profile resolver.
    resolver: Arc<ProfileResolver>,
    /// Delivery channels.
    notifier: Arc<dyn Notifier>,
    /// Evaluation kill switch from configuration.
    enabled: bool,
}

impl std::fmt::Debug for AlertEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertEvaluator").finish()
    }
}

impl AlertEvaluator {
    /// Creates a new evaluator.
    pub fn new(
        alert_repo: Arc<AlertRepository>,
        usage_repo: Arc<UsageRepository>,
        resolver: Arc<ProfileResolver>,
        notifier: Arc<dyn Notifier>,
        enabled: bool,
    ) -> Self {
        Self {
            alert_repo,
            usage_repo,
            resolver,
            notifier,
            enabled,
        }
    }

    /// Evaluate every active rule against every active ledger.
    ///
    /// A rule fires for a user at most once between two resets of its
    /// window; the (user, rule) firing memory is compared against the
    /// ledger's own reset mark, not wall-clock time. Delivery failures
    /// are logged and never block the remaining rules.
    pub async fn check_alerts(&self) -> AppResult<Vec<TriggeredAlert>> {
        if !self.enabled {
            return Ok(Vec::new());
        }

        let rules = self.alert_repo.find_active_rules().await?;
        if rules.is_empty() {
            return Ok(Vec::new());
        }

        let mut rules_by_profile: HashMap<Uuid, Vec<&AlertRule>> = HashMap::new();
        for rule in &rules {
            rules_by_profile.entry(rule.profile_id).or_default().push(rule);
        }

        let mut triggered = Vec::new();

        for (ledger, user) in self.usage_repo.find_active_with_users().await? {
            let Some(profile) = self.resolver.resolve_for(&user).await? else {
                continue;
            };
            let Some(profile_rules) = rules_by_profile.get(&profile.id) else {
                continue;
            };

            for rule in profile_rules {
                let Some(limit) = profile.limit_for(rule.window) else {
                    continue;
                };

                if let Some(alert) = self
                    .evaluate_rule(rule, &ledger, &user.username, user.id, limit)
                    .await?
                {
                    triggered.push(alert);
                }
            }
        }

        info!(triggered = triggered.len(), "Alert sweep completed");
        Ok(triggered)
    }

    /// Evaluate one rule for one user; emit and record when it fires.
    async fn evaluate_rule(
        &self,
        rule: &AlertRule,
        ledger: &UsageLedger,
        username: &str,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Option<TriggeredAlert>> {
        let used = ledger.used_in(rule.window);
        let percent = percent_of(used, limit);
        if percent < rule.threshold_percent as u64 {
            return Ok(None);
        }

        let last_fired = self.alert_repo.last_fired(user_id, rule.id).await?;
        if already_fired(last_fired, ledger.last_reset(rule.window)) {
            return Ok(None);
        }

        let message = template::render(
            &rule.message_template,
            &TemplateValues {
                username,
                threshold: rule.threshold_percent,
                percent,
                used,
                limit,
                remaining: (limit - used).max(0),
            },
        );

        let alert = TriggeredAlert {
            user_id,
            username: username.to_string(),
            rule_id: rule.id,
            window: rule.window,
            percent,
            message,
        };

        // The firing is recorded regardless of delivery outcome: the
        // contract is at-most-once per window, not at-least-once.
        self.alert_repo.record_firing(user_id, rule.id).await?;

        if let Err(e) = self.notifier.deliver(rule.channel, &alert).await {
            tracing::error!(
                username = %username,
                rule_id = %rule.id,
                channel = %rule.channel,
                error = %e,
                "Alert delivery failed"
            );
        }

        Ok(Some(alert))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(910, 1000), 91);
        assert_eq!(percent_of(1000, 1000), 100);
        assert_eq!(percent_of(1500, 1000), 150);
        assert_eq!(percent_of(0, 1000), 0);
        assert_eq!(percent_of(-5, 1000), 0);
        assert_eq!(percent_of(5, 0), 0);
        // multi-terabyte totals stay exact in integer arithmetic
        assert_eq!(percent_of(5_497_558_138_880, 10_995_116_277_760), 50);
    }

    #[test]
    fn test_already_fired_within_window() {
        let reset = Utc::now();
        let fired_after = Some(reset + Duration::minutes(5));
        let fired_before = Some(reset - Duration::minutes(5));

        assert!(already_fired(fired_after, reset));
        assert!(!already_fired(fired_before, reset));
        assert!(!already_fired(None, reset));
    }
}
