//! Directory mutations: profile assignment, promotion management, and
//! the ledger/history bookkeeping they imply.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use portal_core::error::AppError;
use portal_core::types::pagination::{PageRequest, PageResponse};
use portal_core::AppResult;
use portal_database::repositories::profile::ProfileRepository;
use portal_database::repositories::promotion::PromotionRepository;
use portal_database::repositories::usage::UsageRepository;
use portal_database::repositories::user::UserRepository;
use portal_entity::profile::Profile;
use portal_entity::promotion::Promotion;
use portal_entity::user::{MemberAccess, User};

use crate::history::HistoryRecorder;
use crate::resolver::ProfileResolver;

/// Applies directory changes and keeps the derived state honest: every
/// effective-profile transition goes through the history recorder, and
/// the usage ledger follows the user in and out of limited service.
#[derive(Debug, Clone)]
pub struct DirectoryService {
    /// User repository.
    user_repo: Arc<UserRepository>,
    /// Profile repository.
    profile_repo: Arc<ProfileRepository>,
    /// Promotion repository.
    promotion_repo: Arc<PromotionRepository>,
    /// Usage ledger repository.
    usage_repo: Arc<UsageRepository>,
    /// Effective-profile resolver.
    resolver: Arc<ProfileResolver>,
    /// Profile-change audit trail.
    recorder: Arc<HistoryRecorder>,
}

impl DirectoryService {
    /// Creates a new directory service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        profile_repo: Arc<ProfileRepository>,
        promotion_repo: Arc<PromotionRepository>,
        usage_repo: Arc<UsageRepository>,
        resolver: Arc<ProfileResolver>,
        recorder: Arc<HistoryRecorder>,
    ) -> Self {
        Self {
            user_repo,
            profile_repo,
            promotion_repo,
            usage_repo,
            resolver,
            recorder,
        }
    }

    /// Set a user's individual profile override.
    ///
    /// The override wins over any promotion profile. The profile must
    /// exist and be active; the user's ledger is created or reactivated
    /// so metering starts immediately.
    pub async fn assign_profile(&self, user_id: Uuid, profile_id: Uuid) -> AppResult<User> {
        let profile = self
            .profile_repo
            .find_by_id(profile_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Profile {profile_id} not found")))?;
        if !profile.active {
            return Err(AppError::validation(format!(
                "Profile '{}' is inactive and cannot be assigned",
                profile.name
            )));
        }

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        let before = self.resolver.resolve_id_for(&user).await?;
        let user = self.user_repo.set_profile_override(user_id, Some(profile_id)).await?;
        let after = self.resolver.resolve_id_for(&user).await?;

        self.recorder.record(user_id, before, after).await?;
        self.usage_repo.ensure_active(user_id).await?;

        info!(
            username = %user.username,
            profile = %profile.name,
            "Profile override assigned"
        );
        Ok(user)
    }

    /// Clear a user's individual profile override.
    ///
    /// The user falls back to the promotion profile, or to the unlimited
    /// default when no promotion applies. A user with no effective
    /// profile left has the ledger deactivated.
    pub async fn clear_profile(&self, user_id: Uuid) -> AppResult<User> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        let before = self.resolver.resolve_id_for(&user).await?;
        let user = self.user_repo.set_profile_override(user_id, None).await?;
        let after = self.resolver.resolve_id_for(&user).await?;

        self.recorder.record(user_id, before, after).await?;

        if after.is_none() {
            self.usage_repo.deactivate(user_id).await?;
        } else {
            self.usage_repo.ensure_active(user_id).await?;
        }

        info!(username = %user.username, "Profile override cleared");
        Ok(user)
    }

    /// Point a promotion at a different profile (or none).
    ///
    /// Every member whose effective profile changes as a result gets a
    /// history entry and matching ledger state. Members shielded by an
    /// individual override see no change and get no entry.
    pub async fn set_promotion_profile(
        &self,
        promotion_id: Uuid,
        profile_id: Option<Uuid>,
    ) -> AppResult<Promotion> {
        if let Some(id) = profile_id {
            let profile = self
                .profile_repo
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Profile {id} not found")))?;
            if !profile.active {
                return Err(AppError::validation(format!(
                    "Profile '{}' is inactive and cannot back a promotion",
                    profile.name
                )));
            }
        }

        let members = self.promotion_repo.members(promotion_id).await?;

        let mut before = Vec::with_capacity(members.len());
        for member in &members {
            before.push(self.resolver.resolve_id_for(member).await?);
        }

        let promotion = self.promotion_repo.set_profile(promotion_id, profile_id).await?;

        for (member, prev) in members.iter().zip(before) {
            let next = self.resolver.resolve_id_for(member).await?;
            self.recorder.record(member.id, prev, next).await?;
            if next.is_none() {
                self.usage_repo.deactivate(member.id).await?;
            } else {
                self.usage_repo.ensure_active(member.id).await?;
            }
        }

        info!(
            promotion = %promotion.code,
            profile_id = ?profile_id,
            members = members.len(),
            "Promotion profile changed"
        );
        Ok(promotion)
    }

    /// Flip a promotion's active flag, returning the new value.
    ///
    /// No history entries are written: resolution is live, so members'
    /// effective profiles change the moment the flag does, and the trail
    /// records explicit assignment changes only.
    pub async fn toggle_promotion(&self, promotion_id: Uuid) -> AppResult<bool> {
        let active = self.promotion_repo.toggle_active(promotion_id).await?;
        info!(promotion_id = %promotion_id, active = active, "Promotion toggled");
        Ok(active)
    }

    /// Access-state listing of a promotion's members.
    pub async fn members(&self, promotion_id: Uuid) -> AppResult<Vec<MemberAccess>> {
        let members = self.promotion_repo.members(promotion_id).await?;
        Ok(members.iter().map(MemberAccess::from).collect())
    }

    /// Access-state listing of a promotion's members, paginated.
    pub async fn members_page(
        &self,
        promotion_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<MemberAccess>> {
        let users = self.promotion_repo.members_page(promotion_id, page).await?;
        let total = users.total_items;
        let items = users.items.iter().map(MemberAccess::from).collect();
        Ok(PageResponse::new(items, page, total))
    }

    /// Effective profile for one user, live.
    pub async fn effective_profile(&self, user_id: Uuid) -> AppResult<Option<Profile>> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;
        self.resolver.resolve_for(&user).await
    }
}
