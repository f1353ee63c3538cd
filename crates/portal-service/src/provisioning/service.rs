//! Activate/deactivate provisioning flows — single user and cohort.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use portal_core::config::provisioning::ProvisioningConfig;
use portal_core::error::{AppError, ErrorKind};
use portal_core::AppResult;
use portal_database::repositories::promotion::PromotionRepository;
use portal_database::repositories::radius::RadiusRepository;
use portal_database::repositories::user::UserRepository;
use portal_entity::profile::Profile;
use portal_entity::radius::{AaaEntrySet, AaaValues};
use portal_entity::user::User;

use crate::resolver::ProfileResolver;

use super::report::BatchReport;

/// Error message for a user without a stored credential mirror.
pub const MISSING_CREDENTIAL: &str = "MissingCredential";

/// Translates access decisions into AAA row mutations.
///
/// Every per-user flow runs in its own transaction under an exclusive
/// row lock on that user, serializing a concurrent activate/deactivate
/// pair on the same account. Bulk flows deliberately take no
/// promotion-wide lock: two bulk calls on the same cohort may interleave
/// at per-user granularity, which keeps one stuck member from blocking
/// the rest.
#[derive(Debug, Clone)]
pub struct ProvisioningService {
    /// Pool for opening per-user transactions.
    pool: PgPool,
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Promotion repository (bulk member iteration).
    promotion_repo: Arc<PromotionRepository>,
    /// AAA-table repository.
    radius_repo: Arc<RadiusRepository>,
    /// Effective-profile resolver.
    resolver: Arc<ProfileResolver>,
    /// Deployment defaults and lock tuning.
    config: ProvisioningConfig,
}

impl ProvisioningService {
    /// Creates a new provisioning service.
    pub fn new(
        pool: PgPool,
        user_repo: Arc<UserRepository>,
        promotion_repo: Arc<PromotionRepository>,
        radius_repo: Arc<RadiusRepository>,
        resolver: Arc<ProfileResolver>,
        config: ProvisioningConfig,
    ) -> Self {
        Self {
            pool,
            user_repo,
            promotion_repo,
            radius_repo,
            resolver,
            config,
        }
    }

    /// Provision one user into the AAA store and allow network access.
    ///
    /// Requires a non-empty credential mirror. Writes the complete entry
    /// set (credential check row, reply rows, group row) and flips
    /// `activated = true, enabled = true`, all in one transaction.
    pub async fn activate_user(&self, user_id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let user = self
            .user_repo
            .lock_for_update(&mut tx, user_id, self.config.lock_wait_timeout_ms)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        if !user.has_credential() {
            return Err(AppError::validation(MISSING_CREDENTIAL));
        }

        // Live resolution; the AAA values come from the effective profile
        // or the deployment defaults when the user is on the unlimited
        // default.
        let profile = self.resolver.resolve_for(&user).await?;
        let values = self.aaa_values(profile.as_ref());
        let password = user.aaa_password.as_deref().unwrap_or_default();
        let set = AaaEntrySet::build(&user.username, password, &values);

        self.radius_repo.replace_entry_set(&mut tx, &set).await?;
        self.user_repo.mark_provisioned(&mut tx, user.id).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit activation", e)
        })?;

        info!(
            user_id = %user.id,
            username = %user.username,
            group = %set.group.groupname,
            profile = profile.as_ref().map(|p| p.name.as_str()).unwrap_or("default"),
            "User activated"
        );
        Ok(())
    }

    /// Remove a user's AAA entry set and block network access.
    ///
    /// Deletes the rows outright (one uniform discipline, so a later
    /// re-activation reproduces the identical set). `activated` stays
    /// set as the has-been-provisioned marker.
    pub async fn deactivate_user(&self, user_id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let user = self
            .user_repo
            .lock_for_update(&mut tx, user_id, self.config.lock_wait_timeout_ms)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        let removed = self
            .radius_repo
            .delete_entry_set(&mut tx, &user.username)
            .await?;
        self.user_repo.mark_deprovisioned(&mut tx, user.id).await?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit deactivation", e)
        })?;

        info!(
            user_id = %user.id,
            username = %user.username,
            rows_removed = removed,
            "User deactivated"
        );
        Ok(())
    }

    /// Activate every member of a promotion, one transaction per user.
    pub async fn activate_promotion(&self, promotion_id: Uuid) -> AppResult<BatchReport> {
        self.run_batch(promotion_id, true).await
    }

    /// Deactivate every member of a promotion, one transaction per user.
    pub async fn deactivate_promotion(&self, promotion_id: Uuid) -> AppResult<BatchReport> {
        self.run_batch(promotion_id, false).await
    }

    /// Shared bulk loop. One member's failure is recorded and the loop
    /// moves on; nothing is rolled back across members.
    async fn run_batch(&self, promotion_id: Uuid, activate: bool) -> AppResult<BatchReport> {
        let promotion = self
            .promotion_repo
            .find_by_id(promotion_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Promotion {promotion_id} not found")))?;

        let members = self.promotion_repo.members(promotion.id).await?;
        let mut report = BatchReport::new(members.len());

        for member in &members {
            let result = if activate {
                self.activate_user(member.id).await
            } else {
                self.deactivate_user(member.id).await
            };

            match result {
                Ok(()) => report.record_ok(),
                Err(e) => {
                    if e.kind == ErrorKind::LockContention {
                        // Likely a concurrent bulk run on the same cohort.
                        // The interleaving is tolerated but operators
                        // should see it.
                        warn!(
                            promotion = %promotion.code,
                            user_id = %member.id,
                            "Lock contention during bulk provisioning; \
                             another activate/deactivate may be interleaving"
                        );
                    }
                    tracing::error!(
                        promotion = %promotion.code,
                        user_id = %member.id,
                        username = %member.username,
                        error = %e,
                        "Bulk provisioning member failed"
                    );
                    report.record_err(member.id, &member.username, &e);
                }
            }
        }

        info!(
            promotion = %promotion.code,
            activate = activate,
            requested = report.requested,
            succeeded = report.succeeded,
            failed = report.failed,
            "Bulk provisioning completed"
        );
        Ok(report)
    }

    /// Derive the AAA attribute values from an effective profile.
    fn aaa_values(&self, profile: Option<&Profile>) -> AaaValues {
        derive_aaa_values(profile, &self.config)
    }

    /// Read back the provisioned entry set for inspection.
    pub async fn entry_set_for(&self, user: &User) -> AppResult<Option<AaaEntrySet>> {
        self.radius_repo.fetch_entry_set(&user.username).await
    }
}

/// Derive the AAA attribute values from an effective profile, falling
/// back to deployment defaults for the unlimited default profile.
fn derive_aaa_values(profile: Option<&Profile>, config: &ProvisioningConfig) -> AaaValues {
    match profile {
        Some(p) => AaaValues {
            session_timeout_seconds: p
                .session_timeout_seconds
                .unwrap_or(config.default_session_timeout_seconds),
            idle_timeout_seconds: p.idle_timeout_seconds,
            rate_limit: p.rate_limit_string(),
            max_sessions: p.max_sessions,
            group: p.name.clone(),
        },
        None => AaaValues {
            session_timeout_seconds: config.default_session_timeout_seconds,
            idle_timeout_seconds: None,
            rate_limit: None,
            max_sessions: None,
            group: config.default_group.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use portal_entity::profile::QuotaMode;

    #[test]
    fn test_default_values_for_unlimited_default() {
        let values = derive_aaa_values(None, &ProvisioningConfig::default());
        assert_eq!(values.session_timeout_seconds, 3600);
        assert_eq!(values.group, "portal-users");
        assert!(values.rate_limit.is_none());
        assert!(values.max_sessions.is_none());
    }

    #[test]
    fn test_profile_values_override_defaults() {
        let profile = Profile {
            id: Uuid::new_v4(),
            name: "gold".to_string(),
            upload_rate: Some("5M".to_string()),
            download_rate: Some("20M".to_string()),
            quota_mode: QuotaMode::Limited,
            daily_limit: Some(5_368_709_120),
            weekly_limit: None,
            monthly_limit: None,
            validity_seconds: None,
            session_timeout_seconds: Some(14_400),
            idle_timeout_seconds: Some(900),
            max_sessions: Some(2),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let values = derive_aaa_values(Some(&profile), &ProvisioningConfig::default());
        assert_eq!(values.session_timeout_seconds, 14_400);
        assert_eq!(values.rate_limit.as_deref(), Some("5M/20M"));
        assert_eq!(values.max_sessions, Some(2));
        assert_eq!(values.group, "gold");
    }
}
