//! Promotion repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use portal_core::error::{AppError, ErrorKind};
use portal_core::result::AppResult;
use portal_core::types::pagination::{PageRequest, PageResponse};
use portal_entity::promotion::{CreatePromotion, Promotion};
use portal_entity::user::User;

/// Repository for promotion CRUD and membership queries.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: PgPool,
}

impl PromotionRepository {
    /// Create a new promotion repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a promotion by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Promotion>> {
        sqlx::query_as::<_, Promotion>("SELECT * FROM promotions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find promotion by id", e)
            })
    }

    /// Find a promotion by its unique code (case-insensitive).
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<Promotion>> {
        sqlx::query_as::<_, Promotion>("SELECT * FROM promotions WHERE LOWER(code) = LOWER($1)")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find promotion by code", e)
            })
    }

    /// Create a new promotion.
    pub async fn create(&self, data: &CreatePromotion) -> AppResult<Promotion> {
        sqlx::query_as::<_, Promotion>(
            "INSERT INTO promotions (code, name, profile_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.code)
        .bind(&data.name)
        .bind(data.profile_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("promotions_code_key") =>
            {
                AppError::conflict(format!("Promotion code '{}' already exists", data.code))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create promotion", e),
        })
    }

    /// Flip the active flag, returning the new value.
    pub async fn toggle_active(&self, id: Uuid) -> AppResult<bool> {
        let row: Option<(bool,)> = sqlx::query_as(
            "UPDATE promotions SET active = NOT active, updated_at = NOW() \
             WHERE id = $1 RETURNING active",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to toggle promotion", e))?;

        row.map(|(active,)| active)
            .ok_or_else(|| AppError::not_found(format!("Promotion {id} not found")))
    }

    /// Point the promotion at a different profile (or None).
    pub async fn set_profile(&self, id: Uuid, profile_id: Option<Uuid>) -> AppResult<Promotion> {
        sqlx::query_as::<_, Promotion>(
            "UPDATE promotions SET profile_id = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to set promotion profile", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Promotion {id} not found")))
    }

    /// All member users of a promotion, stable order.
    pub async fn members(&self, id: Uuid) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE promotion_id = $1 ORDER BY username ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list promotion members", e)
        })
    }

    /// Member users of a promotion, paginated.
    pub async fn members_page(
        &self,
        id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE promotion_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count promotion members", e)
            })?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE promotion_id = $1 \
             ORDER BY username ASC LIMIT $2 OFFSET $3",
        )
        .bind(id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list promotion members", e)
        })?;

        Ok(PageResponse::new(users, page, total as u64))
    }
}
