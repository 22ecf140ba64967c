//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use super::handlers::{
    delete_handler, get_handler, health_handler, list_handler, set_handler, stats_handler,
};
use super::ws::ws_handler;
use super::AppState;

/// Creates the router allowing requests from any origin.
pub fn create_router(state: AppState) -> Router {
    build_router(state, cors_layer(None))
}

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /cache` - Snapshot of every live entry
/// - `POST /cache` - Store a key-value pair
/// - `GET /cache/:key` - Retrieve a value by key
/// - `DELETE /cache/:key` - Delete a key
/// - `GET /ws` - WebSocket change feed
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/cache", get(list_handler).post(set_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/ws", get(ws_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the CORS policy.
///
/// With an explicit origin, credentials are allowed and methods and headers
/// are limited to what the API uses. Without one (or with an origin that is
/// not a valid header value) any origin is accepted.
pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    };

    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
        Err(_) => {
            warn!(origin, "Invalid CORS origin, allowing any origin");
            cors_layer(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::feed::ChangeFeed;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let (feed, _dispatcher) = ChangeFeed::new(16);
        let state = AppState::new(CacheStore::new(100), feed, Duration::from_secs(300));
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_set_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/cache")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"key":"test","value":"hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/cache/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_ws_requires_upgrade() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_cors_preflight_with_explicit_origin() {
        let (feed, _dispatcher) = ChangeFeed::new(16);
        let state = AppState::new(CacheStore::new(10), feed, Duration::from_secs(300));
        let app = build_router(state, cors_layer(Some("http://localhost:3000")));

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/cache")
                    .header("origin", "http://localhost:3000")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            response.headers().get("access-control-allow-credentials").unwrap(),
            "true"
        );
    }
}
