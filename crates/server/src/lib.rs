// crates/server/src/lib.rs
//! Logpack server library.
//!
//! This crate provides the Axum-based HTTP server for the logpack log
//! collection service: a REST API for triggering, polling, and deleting
//! collection jobs, plus static delivery of the finished archives.

pub mod collector;
pub mod error;
pub mod routes;
pub mod state;

pub use error::*;
pub use routes::api_routes;
pub use state::{AppState, Config};

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware.
///
/// This sets up:
/// - API routes (logs, health, landing page)
/// - Static archive delivery out of the artifact directory
/// - CORS for development (allows any origin)
/// - Request tracing
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let artifacts = ServeDir::new(state.config.logs_dir.clone());

    Router::new()
        .merge(api_routes(state))
        .nest_service("/static/logs", artifacts)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<AppState>, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::new(Config {
            logs_dir: dir.path().to_path_buf(),
            collector: "true".to_string(),
            history_length: -1,
        });
        (create_app(state.clone()), state, dir)
    }

    /// Helper to make a GET request to the app.
    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _state, _dir) = test_app();
        let (status, body) = get(app, "/v1/health").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("\"status\":\"ok\""));
        assert!(body.contains("\"uptime_secs\""));
    }

    #[tokio::test]
    async fn test_logs_listing_empty() {
        let (app, _state, _dir) = test_app();
        let (status, body) = get(app, "/v1/logs").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_static_serving_delivers_archives() {
        let (app, state, _dir) = test_app();
        std::fs::write(
            state.config.logs_dir.join("logpack-1.zip"),
            b"archive bytes",
        )
        .unwrap();

        let (status, body) = get(app, "/static/logs/logpack-1.zip").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "archive bytes");
    }

    #[tokio::test]
    async fn test_static_serving_missing_file_is_404() {
        let (app, _state, _dir) = test_app();
        let (status, _body) = get(app, "/static/logs/logpack-missing.zip").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_landing_page_is_html() {
        let (app, _state, _dir) = test_app();
        let (status, body) = get(app, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<html>"));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let (app, _state, _dir) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/health")
                    .header("Origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let allow_origin = response.headers().get("access-control-allow-origin");
        assert!(allow_origin.is_some());
        assert_eq!(allow_origin.unwrap(), "*");
    }

    #[tokio::test]
    async fn test_404_for_unknown_route() {
        let (app, _state, _dir) = test_app();
        let (status, _body) = get(app, "/v1/nonexistent").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
