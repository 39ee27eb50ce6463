// Read side for the HTTP API: live snapshot, bounded history, clear.

use std::sync::Arc;
use tracing::instrument;

use crate::config::HistoryConfig;
use crate::error::StatsError;
use crate::history_repo::{HistoryRepo, clamp_limit};
use crate::models::{HistoryRecord, StatsSnapshot};
use crate::snapshot_builder::SnapshotBuilder;

pub struct QueryService {
    builder: Arc<SnapshotBuilder>,
    history_repo: Arc<HistoryRepo>,
    limits: HistoryConfig,
}

impl QueryService {
    pub fn new(
        builder: Arc<SnapshotBuilder>,
        history_repo: Arc<HistoryRepo>,
        limits: HistoryConfig,
    ) -> Self {
        Self {
            builder,
            history_repo,
            limits,
        }
    }

    /// Fresh snapshot, not read from history. Advances the shared rate tracker.
    pub async fn latest(&self) -> Result<StatsSnapshot, StatsError> {
        self.builder.snapshot().await
    }

    #[instrument(skip(self), fields(operation = "history"))]
    pub async fn history(&self, limit: Option<i64>) -> Result<Vec<HistoryRecord>, StatsError> {
        let max = self.limits.max_limit.min(self.history_repo.max_limit());
        let limit = clamp_limit(limit, self.limits.default_limit, max);
        self.history_repo.query(limit).await
    }

    #[instrument(skip(self), fields(operation = "clear_history"))]
    pub async fn clear_history(&self) -> Result<u64, StatsError> {
        let deleted = self.history_repo.clear().await?;
        tracing::info!(deleted, "history cleared");
        Ok(deleted)
    }
}
