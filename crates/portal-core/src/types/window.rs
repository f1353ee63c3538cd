//! Quota window enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three independent rolling accounting periods.
///
/// Each window carries its own counter and last-reset mark on a usage
/// ledger; resetting one never touches the other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "quota_window", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuotaWindow {
    /// Resets every day at midnight.
    Daily,
    /// Resets weekly on a fixed weekday.
    Weekly,
    /// Resets on the 1st of each month.
    Monthly,
}

impl QuotaWindow {
    /// All windows, in daily → monthly order.
    pub const ALL: [QuotaWindow; 3] = [Self::Daily, Self::Weekly, Self::Monthly];

    /// Return the window as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for QuotaWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QuotaWindow {
    type Err = crate::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(crate::AppError::validation(format!(
                "Invalid quota window: '{s}'. Expected one of: daily, weekly, monthly"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("daily".parse::<QuotaWindow>().unwrap(), QuotaWindow::Daily);
        assert_eq!(
            "MONTHLY".parse::<QuotaWindow>().unwrap(),
            QuotaWindow::Monthly
        );
        assert!("fortnightly".parse::<QuotaWindow>().is_err());
    }

    #[test]
    fn test_round_trip() {
        for window in QuotaWindow::ALL {
            assert_eq!(window.as_str().parse::<QuotaWindow>().unwrap(), window);
        }
    }
}
