// Error taxonomy for sampling, persistence and the HTTP surface.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// A host reader call failed. Unsupported-but-harmless readings (load average
    /// on non-Unix hosts) are zero-filled by the reader instead.
    #[error("{metric} unavailable: {reason}")]
    MetricsUnavailable {
        metric: &'static str,
        reason: String,
    },

    #[error("history store: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("sampling tick exceeded {0:?}")]
    TickTimeout(Duration),
}

impl StatsError {
    pub fn unavailable(metric: &'static str, reason: impl ToString) -> Self {
        Self::MetricsUnavailable {
            metric,
            reason: reason.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MetricsUnavailable { .. } | Self::TickTimeout(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StatsError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}
