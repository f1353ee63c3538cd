//! Usage ingestion, window resets, and exceeded-quota queries.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use portal_core::error::AppError;
use portal_core::types::QuotaWindow;
use portal_core::AppResult;
use portal_database::repositories::usage::UsageRepository;
use portal_database::repositories::user::UserRepository;
use portal_entity::usage::{AccountingUpdate, UsageSnapshot};

use crate::resolver::ProfileResolver;

/// One user over at least one window limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceededUser {
    /// The user over quota.
    pub user_id: Uuid,
    /// The user's login name.
    pub username: String,
    /// The exceeded window.
    pub window: QuotaWindow,
    /// Bytes used in that window.
    pub used: i64,
    /// The window's limit from the effective profile.
    pub limit: i64,
}

/// Meters data consumption against the per-window counters.
#[derive(Debug, Clone)]
pub struct QuotaService {
    /// Usage ledger repository.
    usage_repo: Arc<UsageRepository>,
    /// User repository (username → ledger key).
    user_repo: Arc<UserRepository>,
    /// Effective-profile resolver for limit lookups.
    resolver: Arc<ProfileResolver>,
}

impl QuotaService {
    /// Creates a new quota service.
    pub fn new(
        usage_repo: Arc<UsageRepository>,
        user_repo: Arc<UserRepository>,
        resolver: Arc<ProfileResolver>,
    ) -> Self {
        Self {
            usage_repo,
            user_repo,
            resolver,
        }
    }

    /// Ingest one accounting update for a username.
    ///
    /// The combined byte total (octets plus gigaword overflow) is added
    /// atomically to every window whose last reset precedes the record's
    /// timestamp — a record from before a reset boundary is not counted
    /// into the freshly reset window.
    pub async fn record_usage(
        &self,
        username: &str,
        update: &AccountingUpdate,
    ) -> AppResult<UsageSnapshot> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{username}' not found")))?;

        let total = update.total_bytes();
        let bytes = i64::try_from(total).map_err(|_| {
            AppError::validation(format!(
                "Accounting total {total} overflows the ledger counter"
            ))
        })?;

        let ledger = self
            .usage_repo
            .add_usage(user.id, bytes, update.recorded_at)
            .await?;

        info!(
            username = %username,
            bytes = bytes,
            today = ledger.used_today,
            "Usage recorded"
        );
        Ok(ledger.snapshot())
    }

    /// Current usage across all three windows.
    pub async fn current_usage(&self, user_id: Uuid) -> AppResult<UsageSnapshot> {
        let ledger = self
            .usage_repo
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No usage ledger for user {user_id}")))?;
        Ok(ledger.snapshot())
    }

    /// Whether a user has met or passed the effective profile's limit for
    /// one window. No ledger, no effective profile, or no limit for the
    /// window all mean not exceeded.
    pub async fn is_exceeded(&self, user_id: Uuid, window: QuotaWindow) -> AppResult<bool> {
        let Some(ledger) = self.usage_repo.find_by_user(user_id).await? else {
            return Ok(false);
        };

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        let limit = match self.resolver.resolve_for(&user).await? {
            Some(profile) => profile.limit_for(window),
            None => None,
        };

        Ok(ledger.exceeds(window, limit))
    }

    /// Zero one window across all active ledgers.
    ///
    /// Invoked by the scheduler at the window's boundary; the other two
    /// windows and their reset marks are untouched.
    pub async fn reset_window(&self, window: QuotaWindow) -> AppResult<u64> {
        let rows = self.usage_repo.reset_window(window).await?;
        info!(window = %window, rows = rows, "Quota window reset");
        Ok(rows)
    }

    /// Every user currently over at least one window limit, one entry per
    /// exceeded (user, window) pair.
    pub async fn exceeded_users(&self) -> AppResult<Vec<ExceededUser>> {
        let mut exceeded = Vec::new();

        for (ledger, user) in self.usage_repo.find_active_with_users().await? {
            let Some(profile) = self.resolver.resolve_for(&user).await? else {
                continue;
            };

            for window in QuotaWindow::ALL {
                if let Some(limit) = profile.limit_for(window) {
                    if ledger.exceeds(window, Some(limit)) {
                        exceeded.push(ExceededUser {
                            user_id: user.id,
                            username: user.username.clone(),
                            window,
                            used: ledger.used_in(window),
                            limit,
                        });
                    }
                }
            }
        }

        Ok(exceeded)
    }
}
