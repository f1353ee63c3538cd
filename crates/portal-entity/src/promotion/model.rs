//! Promotion entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named cohort of user accounts that can share a profile and be
/// bulk-provisioned together.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Promotion {
    /// Unique promotion identifier.
    pub id: Uuid,
    /// Unique short code users register under (e.g. `"X2027"`).
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Whether the promotion is offered for self-registration and
    /// participates in profile resolution.
    pub active: bool,
    /// Profile applied to members without an individual override.
    pub profile_id: Option<Uuid>,
    /// When the promotion was created.
    pub created_at: DateTime<Utc>,
    /// When the promotion was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new promotion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePromotion {
    /// Unique short code.
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Optional cohort profile.
    pub profile_id: Option<Uuid>,
}
