//! Quota mode enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a profile meters data consumption at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "quota_mode", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuotaMode {
    /// No byte limits apply, ever.
    Unlimited,
    /// The per-window byte limits on the profile are enforced.
    Limited,
}

impl QuotaMode {
    /// Return the mode as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unlimited => "unlimited",
            Self::Limited => "limited",
        }
    }
}

impl fmt::Display for QuotaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuotaMode {
    type Err = portal_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unlimited" => Ok(Self::Unlimited),
            "limited" => Ok(Self::Limited),
            _ => Err(portal_core::AppError::validation(format!(
                "Invalid quota mode: '{s}'. Expected one of: unlimited, limited"
            ))),
        }
    }
}
