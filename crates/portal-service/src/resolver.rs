//! Effective-profile resolution.
//!
//! The override hierarchy is a small ordered chain: the user's
//! individual profile override wins, then the profile of the user's
//! promotion, then the unlimited system default (None). The decision
//! itself is the pure [`resolve_effective`] function; the
//! [`ProfileResolver`] service only loads the directory rows and hands
//! them to it. Resolution is re-evaluated on every call — a promotion
//! that goes inactive immediately drops out without any migration step.

use std::sync::Arc;

use uuid::Uuid;

use portal_core::AppResult;
use portal_database::repositories::profile::ProfileRepository;
use portal_database::repositories::promotion::PromotionRepository;
use portal_entity::profile::Profile;
use portal_entity::promotion::Promotion;
use portal_entity::user::User;

/// Pick the effective profile from already-loaded directory state.
///
/// First match wins: an active individual override, then an active
/// promotion's active profile, then None. Inactive links at any step
/// fall through to the next rule.
pub fn resolve_effective<'a>(
    override_profile: Option<&'a Profile>,
    promotion: Option<&Promotion>,
    promotion_profile: Option<&'a Profile>,
) -> Option<&'a Profile> {
    if let Some(profile) = override_profile {
        if profile.active {
            return Some(profile);
        }
    }
    if let Some(promotion) = promotion {
        if promotion.active {
            if let Some(profile) = promotion_profile {
                if profile.active {
                    return Some(profile);
                }
            }
        }
    }
    None
}

/// Loads a user's directory links and resolves the effective profile.
#[derive(Debug, Clone)]
pub struct ProfileResolver {
    /// Profile repository.
    profile_repo: Arc<ProfileRepository>,
    /// Promotion repository.
    promotion_repo: Arc<PromotionRepository>,
}

impl ProfileResolver {
    /// Creates a new resolver.
    pub fn new(
        profile_repo: Arc<ProfileRepository>,
        promotion_repo: Arc<PromotionRepository>,
    ) -> Self {
        Self {
            profile_repo,
            promotion_repo,
        }
    }

    /// Resolve the effective profile for a user, live.
    pub async fn resolve_for(&self, user: &User) -> AppResult<Option<Profile>> {
        let override_profile = match user.profile_id {
            Some(id) => self.profile_repo.find_by_id(id).await?,
            None => None,
        };

        let promotion = match user.promotion_id {
            Some(id) => self.promotion_repo.find_by_id(id).await?,
            None => None,
        };

        let promotion_profile = match promotion.as_ref().and_then(|p| p.profile_id) {
            Some(id) => self.profile_repo.find_by_id(id).await?,
            None => None,
        };

        Ok(resolve_effective(
            override_profile.as_ref(),
            promotion.as_ref(),
            promotion_profile.as_ref(),
        )
        .cloned())
    }

    /// Resolve the effective profile *id* for a user, live.
    pub async fn resolve_id_for(&self, user: &User) -> AppResult<Option<Uuid>> {
        Ok(self.resolve_for(user).await?.map(|p| p.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use portal_entity::profile::QuotaMode;

    fn profile(name: &str, active: bool) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            upload_rate: None,
            download_rate: None,
            quota_mode: QuotaMode::Unlimited,
            daily_limit: None,
            weekly_limit: None,
            monthly_limit: None,
            validity_seconds: None,
            session_timeout_seconds: None,
            idle_timeout_seconds: None,
            max_sessions: None,
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn promotion(active: bool, profile_id: Option<Uuid>) -> Promotion {
        Promotion {
            id: Uuid::new_v4(),
            code: "X2027".to_string(),
            name: "Class of 2027".to_string(),
            active,
            profile_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_override_wins_over_promotion() {
        let over = profile("override", true);
        let cohort = profile("cohort", true);
        let promo = promotion(true, Some(cohort.id));

        let resolved = resolve_effective(Some(&over), Some(&promo), Some(&cohort));
        assert_eq!(resolved.map(|p| p.id), Some(over.id));
    }

    #[test]
    fn test_inactive_override_falls_through() {
        let over = profile("override", false);
        let cohort = profile("cohort", true);
        let promo = promotion(true, Some(cohort.id));

        let resolved = resolve_effective(Some(&over), Some(&promo), Some(&cohort));
        assert_eq!(resolved.map(|p| p.id), Some(cohort.id));
    }

    #[test]
    fn test_inactive_promotion_falls_to_default() {
        let cohort = profile("cohort", true);
        let promo = promotion(false, Some(cohort.id));

        assert!(resolve_effective(None, Some(&promo), Some(&cohort)).is_none());
    }

    #[test]
    fn test_inactive_promotion_profile_falls_to_default() {
        let cohort = profile("cohort", false);
        let promo = promotion(true, Some(cohort.id));

        assert!(resolve_effective(None, Some(&promo), Some(&cohort)).is_none());
    }

    #[test]
    fn test_no_links_resolves_to_default() {
        assert!(resolve_effective(None, None, None).is_none());
    }

    #[test]
    fn test_resolution_is_live_not_cached() {
        // The same inputs with a flipped promotion flag resolve
        // differently on the next call; there is no memoized state.
        let cohort = profile("cohort", true);
        let mut promo = promotion(true, Some(cohort.id));

        assert!(resolve_effective(None, Some(&promo), Some(&cohort)).is_some());
        promo.active = false;
        assert!(resolve_effective(None, Some(&promo), Some(&cohort)).is_none());
    }
}
