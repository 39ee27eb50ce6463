// HTTP routes

mod http;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::query_service::QueryService;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) query: Arc<QueryService>,
}

pub fn app(query: Arc<QueryService>) -> Router {
    let state = AppState { query };
    Router::new()
        .route("/", get(|| async { "homestats: sampling host metrics" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/stats", get(http::stats_handler)) // GET /api/stats
        .route("/api/history", get(http::history_handler)) // GET /api/history?limit=
        .route("/api/clear-history", post(http::clear_history_handler)) // POST /api/clear-history
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
