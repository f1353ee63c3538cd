//! Profile history entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// How a user's effective profile changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "profile_change_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProfileChangeKind {
    /// A profile was assigned where none applied before.
    Assigned,
    /// One profile was replaced by another.
    Updated,
    /// The user fell back to the unlimited default.
    Removed,
}

impl ProfileChangeKind {
    /// Classify a before/after pair. Returns None when nothing changed.
    pub fn classify(before: Option<Uuid>, after: Option<Uuid>) -> Option<Self> {
        match (before, after) {
            (None, Some(_)) => Some(Self::Assigned),
            (Some(b), Some(a)) if b != a => Some(Self::Updated),
            (Some(_), None) => Some(Self::Removed),
            _ => None,
        }
    }

    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Updated => "updated",
            Self::Removed => "removed",
        }
    }
}

impl fmt::Display for ProfileChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable audit record of an effective-profile change.
///
/// Appended synchronously on every change; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileHistoryEntry {
    /// Unique entry identifier.
    pub id: Uuid,
    /// The user whose effective profile changed.
    pub user_id: Uuid,
    /// Effective profile before the change (None = unlimited default).
    pub previous_profile_id: Option<Uuid>,
    /// Effective profile after the change (None = unlimited default).
    pub new_profile_id: Option<Uuid>,
    /// Classification of the change.
    pub change_kind: ProfileChangeKind,
    /// When the change was recorded.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(
            ProfileChangeKind::classify(None, Some(a)),
            Some(ProfileChangeKind::Assigned)
        );
        assert_eq!(
            ProfileChangeKind::classify(Some(a), Some(b)),
            Some(ProfileChangeKind::Updated)
        );
        assert_eq!(
            ProfileChangeKind::classify(Some(a), None),
            Some(ProfileChangeKind::Removed)
        );
        assert_eq!(ProfileChangeKind::classify(Some(a), Some(a)), None);
        assert_eq!(ProfileChangeKind::classify(None, None), None);
    }
}
