//! AAA row models.
//!
//! These mirror the FreeRADIUS `radcheck`/`radreply`/`radusergroup`
//! tables the NAS consults at connection time. The row shapes are a
//! bit-exact external boundary: one credential check row, zero or more
//! reply rows, one group row, all keyed by username.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Check attribute carrying the credential mirror.
pub const ATTR_CLEARTEXT_PASSWORD: &str = "Cleartext-Password";
/// Check attribute limiting simultaneous sessions.
pub const ATTR_SIMULTANEOUS_USE: &str = "Simultaneous-Use";
/// Reply attribute for the session timeout, in seconds.
pub const ATTR_SESSION_TIMEOUT: &str = "Session-Timeout";
/// Reply attribute for the idle timeout, in seconds.
pub const ATTR_IDLE_TIMEOUT: &str = "Idle-Timeout";
/// Reply attribute carrying the `"<upload>/<download>"` rate limit.
pub const ATTR_RATE_LIMIT: &str = "Mikrotik-Rate-Limit";
/// The assignment operator used for all provisioned attributes.
pub const OP_SET: &str = ":=";

/// One row of the `radcheck` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RadCheck {
    /// Username the row is keyed by.
    pub username: String,
    /// Attribute name.
    pub attribute: String,
    /// Attribute operator.
    pub op: String,
    /// Attribute value.
    pub value: String,
}

/// One row of the `radreply` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RadReply {
    /// Username the row is keyed by.
    pub username: String,
    /// Attribute name.
    pub attribute: String,
    /// Attribute operator.
    pub op: String,
    /// Attribute value.
    pub value: String,
}

/// One row of the `radusergroup` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RadUserGroup {
    /// Username the row is keyed by.
    pub username: String,
    /// Group the user belongs to.
    pub groupname: String,
    /// Group evaluation priority.
    pub priority: i32,
}

/// The complete provisioned state for one user.
///
/// Activation writes the whole set inside one transaction;
/// deactivation removes the whole set. A partial set must never exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaaEntrySet {
    /// Credential and constraint check rows.
    pub checks: Vec<RadCheck>,
    /// Session parameter reply rows.
    pub replies: Vec<RadReply>,
    /// Group membership row.
    pub group: RadUserGroup,
}

/// Inputs for building an entry set, already resolved from the
/// effective profile (or deployment defaults).
#[derive(Debug, Clone)]
pub struct AaaValues {
    /// Session-Timeout seconds.
    pub session_timeout_seconds: i64,
    /// Idle-Timeout seconds, when configured.
    pub idle_timeout_seconds: Option<i64>,
    /// `"<upload>/<download>"` rate limit, when either side is capped.
    pub rate_limit: Option<String>,
    /// Simultaneous-Use cap, when configured.
    pub max_sessions: Option<i32>,
    /// AAA group name.
    pub group: String,
}

impl AaaEntrySet {
    /// Assemble the full row set for one user.
    pub fn build(username: &str, password: &str, values: &AaaValues) -> Self {
        let mut checks = vec![RadCheck {
            username: username.to_string(),
            attribute: ATTR_CLEARTEXT_PASSWORD.to_string(),
            op: OP_SET.to_string(),
            value: password.to_string(),
        }];
        if let Some(max) = values.max_sessions {
            checks.push(RadCheck {
                username: username.to_string(),
                attribute: ATTR_SIMULTANEOUS_USE.to_string(),
                op: OP_SET.to_string(),
                value: max.to_string(),
            });
        }

        let mut replies = vec![RadReply {
            username: username.to_string(),
            attribute: ATTR_SESSION_TIMEOUT.to_string(),
            op: OP_SET.to_string(),
            value: values.session_timeout_seconds.to_string(),
        }];
        if let Some(idle) = values.idle_timeout_seconds {
            replies.push(RadReply {
                username: username.to_string(),
                attribute: ATTR_IDLE_TIMEOUT.to_string(),
                op: OP_SET.to_string(),
                value: idle.to_string(),
            });
        }
        if let Some(rate) = &values.rate_limit {
            replies.push(RadReply {
                username: username.to_string(),
                attribute: ATTR_RATE_LIMIT.to_string(),
                op: OP_SET.to_string(),
                value: rate.clone(),
            });
        }

        Self {
            checks,
            replies,
            group: RadUserGroup {
                username: username.to_string(),
                groupname: values.group.clone(),
                priority: 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_full_set() {
        let values = AaaValues {
            session_timeout_seconds: 7200,
            idle_timeout_seconds: Some(600),
            rate_limit: Some("512k/2M".to_string()),
            max_sessions: Some(1),
            group: "bronze".to_string(),
        };
        let set = AaaEntrySet::build("alice", "s3cret", &values);

        assert_eq!(set.checks.len(), 2);
        assert_eq!(set.checks[0].attribute, ATTR_CLEARTEXT_PASSWORD);
        assert_eq!(set.checks[0].value, "s3cret");
        assert_eq!(set.checks[1].attribute, ATTR_SIMULTANEOUS_USE);

        assert_eq!(set.replies.len(), 3);
        assert_eq!(set.replies[0].attribute, ATTR_SESSION_TIMEOUT);
        assert_eq!(set.replies[0].value, "7200");
        assert_eq!(set.replies[2].value, "512k/2M");

        assert_eq!(set.group.groupname, "bronze");
        assert_eq!(set.group.priority, 1);
    }

    #[test]
    fn test_build_is_deterministic() {
        // activate → deactivate → activate must reproduce the same set
        let values = AaaValues {
            session_timeout_seconds: 3600,
            idle_timeout_seconds: None,
            rate_limit: None,
            max_sessions: None,
            group: "portal-users".to_string(),
        };
        let first = AaaEntrySet::build("bob", "pw", &values);
        let second = AaaEntrySet::build("bob", "pw", &values);
        assert_eq!(first, second);
        assert_eq!(first.checks.len(), 1);
        assert_eq!(first.replies.len(), 1);
    }
}
