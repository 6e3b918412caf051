//! API Routes
//!
//! Configures the Axum router with all aggregation cache endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    aggregate_handler, clear_handler, health_handler, invalidate_handler, stats_handler,
    value_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /aggregate/:group_by/:column/:func` - Compute-or-fetch an aggregation
/// - `GET /value/:group_by/:column/:func/:field` - One field of a cached entry
/// - `DELETE /invalidate/:group_by/:column/:func` - Remove one entry
/// - `DELETE /clear` - Bulk-remove entries by pattern
/// - `GET /stats` - Store activity counters
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/aggregate/:group_by/:column/:func", get(aggregate_handler))
        .route(
            "/value/:group_by/:column/:func/:field",
            get(value_handler),
        )
        .route(
            "/invalidate/:group_by/:column/:func",
            delete(invalidate_handler),
        )
        .route("/clear", delete(clear_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, NamedTempFile) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"AIRLINE,ARRIVAL_DELAY\nAA,10\nAA,20\nUA,5\n")
            .unwrap();
        file.flush().unwrap();

        let store = Arc::new(MemoryStore::default());
        let state = AppState::new(store, file.path().to_path_buf(), 900).unwrap();
        (create_router(state), file)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _file) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_aggregate_endpoint() {
        let (app, _file) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/aggregate/AIRLINE/ARRIVAL_DELAY/mean")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (app, _file) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
