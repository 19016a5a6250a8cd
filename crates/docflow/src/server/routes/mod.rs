//! API routes for the ingestion server

pub mod events;
pub mod records;

use axum::{
    routing::get,
    Json, Router,
};

use crate::server::state::{AppState, StatsSnapshot};

/// Build the `/api` routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/records/:file_id", get(records::get_record))
        .route("/stats", get(stats))
        .route("/info", get(info))
}

/// GET /api/stats - ingest counters
async fn stats(state: axum::extract::State<AppState>) -> Json<StatsSnapshot> {
    Json(state.stats().snapshot())
}

/// GET /api/info - endpoint catalog
async fn info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "docflow",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Event-driven document ingestion: extract, classify, chunk, embed, index",
        "endpoints": {
            "POST /events": "Object-created notification webhook",
            "GET /api/records/:file_id": "Registry record for a file",
            "GET /api/stats": "Ingest counters",
            "GET /api/info": "This catalog",
            "GET /health": "Liveness probe",
            "GET /ready": "Readiness probe"
        }
    }))
}
