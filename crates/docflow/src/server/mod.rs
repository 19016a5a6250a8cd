//! HTTP server for the ingestion pipeline

pub mod routes;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use state::AppState;

/// Ingestion HTTP server
pub struct IngestServer {
    config: PipelineConfig,
    state: AppState,
}

impl IngestServer {
    /// Create a new server, building the pipeline state
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let state = AppState::new(config.clone())?;
        Ok(Self { config, state })
    }

    /// Build the router with all routes
    fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_check))
            .route("/ready", get(readiness))
            .route("/events", post(routes::events::receive_event))
            .nest("/api", routes::api_routes())
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        if self.config.server.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            router = router.layer(cors);
        }

        router
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.server.host, self.config.server.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = self.build_router();

        tracing::info!("Starting ingestion server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Readiness check endpoint
async fn readiness() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PipelineConfig, RecordStoreConfig};
    use crate::types::FileRecord;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    fn test_server() -> (IngestServer, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            records: RecordStoreConfig {
                db_path: dir.path().join("records.db"),
            },
            ..PipelineConfig::default()
        };
        (IngestServer::new(config).unwrap(), dir)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (server, _dir) = test_server();
        let router = server.build_router();

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_record_lookup_roundtrip() {
        let (server, _dir) = test_server();
        let record = FileRecord::new("abc123", Some("report.pdf".to_string()));
        server.state.records().insert(&record).unwrap();
        let router = server.build_router();

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api/records/abc123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["file_id"], "abc123");
        assert_eq!(json["filename"], "report.pdf");
    }

    #[tokio::test]
    async fn test_missing_record_is_404() {
        let (server, _dir) = test_server();
        let router = server.build_router();

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api/records/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stats_start_at_zero() {
        let (server, _dir) = test_server();
        let router = server.build_router();

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["events_received"], 0);
        assert_eq!(json["files_processed"], 0);
    }

    #[tokio::test]
    async fn test_event_with_no_records_fails_gracefully() {
        let (server, _dir) = test_server();
        let router = server.build_router();

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/events")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"Records": []}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        // structured failure body, not a transport-level error
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "failed");
    }
}
