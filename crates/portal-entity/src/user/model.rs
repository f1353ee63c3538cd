//! User entity model (access-relevant fields).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::access::AccessState;

/// An account with network-access state.
///
/// Only the fields this control plane owns are modeled here; profile
/// data, vouchers, and device registrations live elsewhere in the portal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name; also the key into the AAA tables.
    pub username: String,
    /// Individual profile override (takes precedence over the promotion's).
    pub profile_id: Option<Uuid>,
    /// Cohort membership.
    pub promotion_id: Option<Uuid>,
    /// Set true by the first successful provisioning; never cleared.
    pub activated: bool,
    /// Whether the user is currently allowed on the network.
    pub enabled: bool,
    /// Plaintext credential mirror required by the AAA protocol.
    /// A deliberate, documented trade-off; never logged.
    #[serde(skip_serializing)]
    pub aaa_password: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Current derived access state.
    pub fn access_state(&self) -> AccessState {
        AccessState::from_flags(self.activated, self.enabled)
    }

    /// Whether a usable credential mirror is stored.
    pub fn has_credential(&self) -> bool {
        self.aaa_password
            .as_deref()
            .is_some_and(|pw| !pw.is_empty())
    }
}

/// Per-user row in a cohort member listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberAccess {
    /// User identifier.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Derived access state.
    pub access_state: AccessState,
}

impl From<&User> for MemberAccess {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            access_state: user.access_state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            profile_id: None,
            promotion_id: None,
            activated: false,
            enabled: false,
            aaa_password: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_credential() {
        let mut u = user();
        assert!(!u.has_credential());
        u.aaa_password = Some(String::new());
        assert!(!u.has_credential());
        u.aaa_password = Some("s3cret".to_string());
        assert!(u.has_credential());
    }

    #[test]
    fn test_access_state() {
        let mut u = user();
        assert_eq!(u.access_state(), AccessState::NeverProvisioned);
        u.activated = true;
        u.enabled = true;
        assert_eq!(u.access_state(), AccessState::Enabled);
        u.enabled = false;
        assert_eq!(u.access_state(), AccessState::Disabled);
    }
}
