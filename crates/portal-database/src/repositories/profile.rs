//! Profile repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_entity::profile::{CreateProfile, Profile};

/// Repository for profile CRUD and query operations.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Create a new profile repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a profile by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find profile by id", e)
            })
    }

    /// Find a profile by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Profile>> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE LOWER(name) = LOWER($1)")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find profile by name", e)
            })
    }

    /// List all profiles, active first.
    pub async fn find_all(&self) -> AppResult<Vec<Profile>> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY active DESC, name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list profiles", e))
    }

    /// Create a new profile.
    pub async fn create(&self, data: &CreateProfile) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (name, upload_rate, download_rate, quota_mode, \
                                   daily_limit, weekly_limit, monthly_limit, \
                                   validity_seconds, session_timeout_seconds, \
                                   idle_timeout_seconds, max_sessions) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.upload_rate)
        .bind(&data.download_rate)
        .bind(data.quota_mode)
        .bind(data.daily_limit)
        .bind(data.weekly_limit)
        .bind(data.monthly_limit)
        .bind(data.validity_seconds)
        .bind(data.session_timeout_seconds)
        .bind(data.idle_timeout_seconds)
        .bind(data.max_sessions)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("profiles_name_key") =>
            {
                AppError::conflict(format!("Profile '{}' already exists", data.name))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create profile", e),
        })
    }

    /// Set the active flag (soft enable/disable).
    pub async fn set_active(&self, id: Uuid, active: bool) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>(
            "UPDATE profiles SET active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update profile active flag", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Profile {id} not found")))
    }
}
