//! Bulk provisioning report.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use portal_core::AppError;
use portal_core::error::ErrorKind;

/// One member's failure inside a bulk operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProvisionError {
    /// The failing user.
    pub user_id: Uuid,
    /// The failing user's login name.
    pub username: String,
    /// Error category.
    pub kind: ErrorKind,
    /// Error message.
    pub error: String,
}

/// Aggregate result of a bulk activate/deactivate call.
///
/// Individual failures never abort the batch; they accumulate here and
/// `succeeded + failed == requested` always holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Number of members the batch attempted.
    pub requested: usize,
    /// Members whose per-user transaction committed.
    pub succeeded: usize,
    /// Members whose per-user transaction failed.
    pub failed: usize,
    /// One entry per failed member.
    pub per_user_errors: Vec<UserProvisionError>,
}

impl BatchReport {
    /// Start a report for a batch of known size.
    pub fn new(requested: usize) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    /// Record one member success.
    pub fn record_ok(&mut self) {
        self.succeeded += 1;
    }

    /// Record one member failure.
    pub fn record_err(&mut self, user_id: Uuid, username: &str, error: &AppError) {
        self.failed += 1;
        self.per_user_errors.push(UserProvisionError {
            user_id,
            username: username.to_string(),
            kind: error.kind,
            error: error.message.clone(),
        });
    }

    /// Whether any member failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// The accounting invariant every finished batch satisfies.
    pub fn is_balanced(&self) -> bool {
        self.succeeded + self.failed == self.requested
            && self.per_user_errors.len() == self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_accumulation() {
        let mut report = BatchReport::new(3);
        report.record_ok();
        report.record_ok();
        let err = AppError::validation("MissingCredential");
        report.record_err(Uuid::new_v4(), "carol", &err);

        assert_eq!(report.requested, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert!(report.has_failures());
        assert!(report.is_balanced());
        assert_eq!(report.per_user_errors[0].username, "carol");
        assert_eq!(report.per_user_errors[0].error, "MissingCredential");
        assert_eq!(report.per_user_errors[0].kind, ErrorKind::Validation);
    }

    #[test]
    fn test_empty_batch_is_balanced() {
        let report = BatchReport::new(0);
        assert!(report.is_balanced());
        assert!(!report.has_failures());
    }
}
