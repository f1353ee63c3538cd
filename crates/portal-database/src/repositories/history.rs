//! Profile history repository implementation.
//!
//! Append and read only; the table has no update or delete path.

use sqlx::PgPool;
use uuid::Uuid;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_core::types::pagination::{PageRequest, PageResponse};
use portal_entity::history::{ProfileChangeKind, ProfileHistoryEntry};

/// Repository for the append-only profile history.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: PgPool,
}

impl HistoryRepository {
    /// Create a new history repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one history entry.
    pub async fn append(
        &self,
        user_id: Uuid,
        previous_profile_id: Option<Uuid>,
        new_profile_id: Option<Uuid>,
        change_kind: ProfileChangeKind,
    ) -> AppResult<ProfileHistoryEntry> {
        sqlx::query_as::<_, ProfileHistoryEntry>(
            "INSERT INTO profile_history (user_id, previous_profile_id, new_profile_id, change_kind) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(user_id)
        .bind(previous_profile_id)
        .bind(new_profile_id)
        .bind(change_kind)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append history", e))
    }

    /// History for one user, append order, oldest first.
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ProfileHistoryEntry>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM profile_history WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count history", e)
                })?;

        let entries = sqlx::query_as::<_, ProfileHistoryEntry>(
            "SELECT * FROM profile_history WHERE user_id = $1 \
             ORDER BY created_at ASC, id ASC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list history", e))?;

        Ok(PageResponse::new(entries, page, total as u64))
    }
}
