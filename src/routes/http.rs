// JSON handlers: version, live stats, history, clear-history

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use std::num::IntErrorKind;

use super::AppState;
use crate::error::StatsError;
use crate::models::{HistoryRecord, StatsSnapshot};

/// GET /version — service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/stats — fresh snapshot, 503 when the host cannot be read.
pub(super) async fn stats_handler(
    State(state): State<AppState>,
) -> Result<Json<StatsSnapshot>, StatsError> {
    state.query.latest().await.map(Json)
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryParams {
    limit: Option<String>,
}

impl HistoryParams {
    /// Unparseable values count as missing; integers too wide for i64 saturate.
    fn limit(&self) -> Option<i64> {
        let raw = self.limit.as_deref()?.trim();
        match raw.parse::<i64>() {
            Ok(n) => Some(n),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => Some(i64::MAX),
                IntErrorKind::NegOverflow => Some(i64::MIN),
                _ => None,
            },
        }
    }
}

/// GET /api/history?limit=N — oldest-first window of the most recent N rows.
pub(super) async fn history_handler(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<HistoryRecord>>, StatsError> {
    state.query.history(params.limit()).await.map(Json)
}

/// POST /api/clear-history — `{status, message}`; 500 with the failure detail on error.
pub(super) async fn clear_history_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, StatsError> {
    let deleted = state.query.clear_history().await?;
    Ok(Json(serde_json::json!({
        "status": "success",
        "message": format!("History cleared ({} records removed)", deleted),
    })))
}
