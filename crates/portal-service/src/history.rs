//! Profile-change audit trail.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use portal_core::AppResult;
use portal_core::types::pagination::{PageRequest, PageResponse};
use portal_database::repositories::history::HistoryRepository;
use portal_entity::history::{ProfileChangeKind, ProfileHistoryEntry};

/// Synchronous observer of effective-profile changes.
///
/// Directory mutations call [`HistoryRecorder::record`] with the
/// before/after effective profile ids; an entry is appended only when
/// they differ. History is never overwritten or pruned.
#[derive(Debug, Clone)]
pub struct HistoryRecorder {
    /// History repository.
    history_repo: Arc<HistoryRepository>,
}

impl HistoryRecorder {
    /// Creates a new recorder.
    pub fn new(history_repo: Arc<HistoryRepository>) -> Self {
        Self { history_repo }
    }

    /// Append one entry when the effective profile actually changed.
    ///
    /// Returns the appended entry, or None for a no-op change.
    pub async fn record(
        &self,
        user_id: Uuid,
        before: Option<Uuid>,
        after: Option<Uuid>,
    ) -> AppResult<Option<ProfileHistoryEntry>> {
        let Some(kind) = ProfileChangeKind::classify(before, after) else {
            return Ok(None);
        };

        let entry = self.history_repo.append(user_id, before, after, kind).await?;

        info!(
            user_id = %user_id,
            change_kind = %kind,
            previous = ?before,
            new = ?after,
            "Profile change recorded"
        );

        Ok(Some(entry))
    }

    /// History for one user, append order, oldest first.
    pub async fn history_for(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ProfileHistoryEntry>> {
        self.history_repo.find_by_user(user_id, page).await
    }
}
