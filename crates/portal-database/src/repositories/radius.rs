//! AAA-table repository.
//!
//! All mutations run inside the caller's transaction so a user's check,
//! reply, and group rows change as one unit — a partial entry set must
//! never be visible to the NAS.

use sqlx::{PgPool, Postgres, Transaction};

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_entity::radius::{AaaEntrySet, RadCheck, RadReply, RadUserGroup};

/// Repository for the radcheck/radreply/radusergroup tables.
#[derive(Debug, Clone)]
pub struct RadiusRepository {
    pool: PgPool,
}

impl RadiusRepository {
    /// Create a new AAA repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replace a user's entire entry set inside `tx`.
    ///
    /// Deletes whatever rows exist for the username first, so repeated
    /// activation converges on exactly the built set.
    pub async fn replace_entry_set(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        set: &AaaEntrySet,
    ) -> AppResult<()> {
        let username = &set.group.username;
        self.delete_entry_set(tx, username).await?;

        for check in &set.checks {
            sqlx::query("INSERT INTO radcheck (username, attribute, op, value) VALUES ($1, $2, $3, $4)")
                .bind(&check.username)
                .bind(&check.attribute)
                .bind(&check.op)
                .bind(&check.value)
                .execute(&mut **tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::ExternalStore, "Failed to write check row", e)
                })?;
        }

        for reply in &set.replies {
            sqlx::query("INSERT INTO radreply (username, attribute, op, value) VALUES ($1, $2, $3, $4)")
                .bind(&reply.username)
                .bind(&reply.attribute)
                .bind(&reply.op)
                .bind(&reply.value)
                .execute(&mut **tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::ExternalStore, "Failed to write reply row", e)
                })?;
        }

        sqlx::query("INSERT INTO radusergroup (username, groupname, priority) VALUES ($1, $2, $3)")
            .bind(&set.group.username)
            .bind(&set.group.groupname)
            .bind(set.group.priority)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalStore, "Failed to write group row", e)
            })?;

        Ok(())
    }

    /// Delete every AAA row for a username inside `tx`.
    ///
    /// Returns how many rows were removed across the three tables.
    pub async fn delete_entry_set(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        username: &str,
    ) -> AppResult<u64> {
        let mut removed = 0u64;
        for table in ["radcheck", "radreply", "radusergroup"] {
            let result = sqlx::query(&format!("DELETE FROM {table} WHERE username = $1"))
                .bind(username)
                .execute(&mut **tx)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::ExternalStore,
                        format!("Failed to delete {table} rows"),
                        e,
                    )
                })?;
            removed += result.rows_affected();
        }
        Ok(removed)
    }

    /// Read back a user's current entry set, if any rows exist.
    pub async fn fetch_entry_set(&self, username: &str) -> AppResult<Option<AaaEntrySet>> {
        let checks = sqlx::query_as::<_, RadCheck>(
            "SELECT username, attribute, op, value FROM radcheck \
             WHERE username = $1 ORDER BY attribute ASC",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::ExternalStore, "Failed to read check rows", e)
        })?;

        let replies = sqlx::query_as::<_, RadReply>(
            "SELECT username, attribute, op, value FROM radreply \
             WHERE username = $1 ORDER BY attribute ASC",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::ExternalStore, "Failed to read reply rows", e)
        })?;

        let group = sqlx::query_as::<_, RadUserGroup>(
            "SELECT username, groupname, priority FROM radusergroup WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::ExternalStore, "Failed to read group row", e)
        })?;

        match group {
            Some(group) => Ok(Some(AaaEntrySet {
                checks,
                replies,
                group,
            })),
            None if checks.is_empty() && replies.is_empty() => Ok(None),
            // Rows without a group row mean a partial set; surface it.
            None => Err(AppError::external_store(format!(
                "Partial AAA entry set for '{username}': rows present without a group row"
            ))),
        }
    }
}
