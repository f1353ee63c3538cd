//! User repository implementation.
//!
//! Besides plain lookups, this repository owns the per-user pessimistic
//! lock used by provisioning: a `SELECT ... FOR UPDATE` inside the
//! caller's transaction, bounded by `SET LOCAL lock_timeout` so a
//! concurrent activate/deactivate pair cannot stall forever.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_entity::user::User;

/// SQLSTATE raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";

/// Repository for user access-state operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    /// Acquire an exclusive row lock on one user inside `tx`.
    ///
    /// Returns None when the user does not exist. A lock wait longer
    /// than `lock_wait_ms` maps to [`ErrorKind::LockContention`].
    pub async fn lock_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        lock_wait_ms: u64,
    ) -> AppResult<Option<User>> {
        // SET does not take bind parameters; the value is a plain integer.
        sqlx::query(&format!("SET LOCAL lock_timeout = '{lock_wait_ms}ms'"))
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to set lock timeout", e)
            })?;

        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err)
                    if db_err.code().as_deref() == Some(LOCK_NOT_AVAILABLE) =>
                {
                    AppError::lock_contention(format!(
                        "User {id} is locked by a concurrent provisioning operation"
                    ))
                }
                _ => AppError::with_source(ErrorKind::Database, "Failed to lock user row", e),
            })
    }

    /// Record a successful activation: sets both access flags.
    pub async fn mark_provisioned(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET activated = TRUE, enabled = TRUE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark provisioned", e))?;
        Ok(())
    }

    /// Record a deactivation: clears `enabled`, leaves `activated` as the
    /// has-been-provisioned marker.
    pub async fn mark_deprovisioned(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> AppResult<()> {
        sqlx::query("UPDATE users SET enabled = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to mark deprovisioned", e)
            })?;
        Ok(())
    }

    /// Set or clear a user's individual profile override.
    pub async fn set_profile_override(
        &self,
        id: Uuid,
        profile_id: Option<Uuid>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET profile_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to set profile override", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Update the plaintext credential mirror (set at registration and on
    /// password change).
    pub async fn set_credential_mirror(&self, id: Uuid, password: &str) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET aaa_password = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Database,
                        "Failed to update credential mirror",
                        e,
                    )
                })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    /// Users currently flagged as enabled.
    pub async fn find_enabled(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE enabled = TRUE ORDER BY username ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list enabled users", e)
            })
    }
}
