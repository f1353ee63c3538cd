//! Derived network-access state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A user's current standing with the AAA store, derived from the
/// `activated`/`enabled` flag pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessState {
    /// Never successfully provisioned.
    NeverProvisioned,
    /// Provisioned and currently allowed on the network.
    Enabled,
    /// Provisioned at least once, currently blocked.
    Disabled,
}

impl AccessState {
    /// Derive the state from the stored flag pair.
    pub fn from_flags(activated: bool, enabled: bool) -> Self {
        match (activated, enabled) {
            (false, _) => Self::NeverProvisioned,
            (true, true) => Self::Enabled,
            (true, false) => Self::Disabled,
        }
    }

    /// Return the state as a kebab-case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeverProvisioned => "never-provisioned",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for AccessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(
            AccessState::from_flags(false, false),
            AccessState::NeverProvisioned
        );
        // enabled without activated cannot occur, but derivation is total
        assert_eq!(
            AccessState::from_flags(false, true),
            AccessState::NeverProvisioned
        );
        assert_eq!(AccessState::from_flags(true, true), AccessState::Enabled);
        assert_eq!(AccessState::from_flags(true, false), AccessState::Disabled);
    }
}
