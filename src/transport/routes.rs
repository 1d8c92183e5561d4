//! Transport Routes
//!
//! Configures the Axum router nodes use to reach each other.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{delete_handler, get_handler, health_handler, stats_handler, AppState};
use super::pool::DEFAULT_BASE_PATH;

/// Creates the router serving under [`DEFAULT_BASE_PATH`].
///
/// # Endpoints
/// - `GET /_peercache/:group/:key` - Fetch a value (raw bytes)
/// - `DELETE /_peercache/:group/:key` - Delete a value
/// - `GET /stats/:group` - Group and store statistics
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    create_router_with_base(state, DEFAULT_BASE_PATH)
}

/// Creates the router serving group values under `base_path`.
pub fn create_router_with_base(state: AppState, base_path: &str) -> Router {
    let base_path = base_path.trim_end_matches('/');

    Router::new()
        .route(
            &format!("{base_path}/:group/:key"),
            get(get_handler).delete(delete_handler),
        )
        .route("/stats/:group", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{GroupRegistry, Loaded, LoaderFn};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let registry = Arc::new(GroupRegistry::new());
        registry.new_group(
            "scores",
            1024,
            LoaderFn(|key: &str| (key == "Tom").then(|| Loaded::new("630"))),
        );
        create_router(AppState::new(registry))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = create_test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_endpoint() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/_peercache/scores/Tom")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .uri("/_peercache/scores/nobody")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_custom_base_path() {
        let registry = Arc::new(GroupRegistry::new());
        registry.new_group("g", 0, LoaderFn(|_key: &str| Some(Loaded::new("v"))));
        let app = create_router_with_base(AppState::new(registry), "/cache/");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/cache/g/k")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
