//! API Routes
//!
//! Two routers: the peer endpoint other nodes fetch from, and the optional
//! JSON frontend for clients.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{api_get_handler, health_handler, peer_handler, stats_handler, AppState};

/// Creates the router peers fetch values from.
///
/// # Endpoints
/// - `GET <base_path>:group/:key` - protobuf `FetchResponse`
/// - `GET /health` - Health check endpoint
///
/// `base_path` must start and end with `/`.
pub fn create_peer_router(state: AppState, base_path: &str) -> Router {
    Router::new()
        .route(&format!("{base_path}:group/:key"), get(peer_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Creates the client-facing router.
///
/// # Endpoints
/// - `GET /api?key=<key>[&group=<group>]` - Read a value through the cache
/// - `GET /stats` - Per-group cache statistics
/// - `GET /health` - Health check endpoint
pub fn create_api_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api", get(api_get_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::group::{GetterFn, GroupRegistry};
    use crate::models::FetchResponse;
    use crate::peers::DEFAULT_BASE_PATH;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use prost::Message;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn test_state() -> AppState {
        let registry = Arc::new(GroupRegistry::new());
        registry.create_group(
            "scores",
            2 << 10,
            GetterFn(|key: String| async move {
                match key.as_str() {
                    "Tom" => Ok(b"630".to_vec()),
                    "a/b c" => Ok(vec![0, 255, 1]),
                    _ => Err::<Vec<u8>, BoxError>(format!("{key} not exist").into()),
                }
            }),
        );
        AppState::new(registry, "scores", "http://localhost:8001")
    }

    async fn send(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, body.to_vec())
    }

    #[tokio::test]
    async fn test_peer_endpoint_serves_protobuf() {
        let app = create_peer_router(test_state(), DEFAULT_BASE_PATH);

        let (status, content_type, body) = send(app, "/_peercache/scores/Tom").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/octet-stream"));
        assert_eq!(FetchResponse::decode(body.as_slice()).unwrap().value, b"630");
    }

    #[tokio::test]
    async fn test_peer_endpoint_decodes_escaped_key() {
        let app = create_peer_router(test_state(), DEFAULT_BASE_PATH);

        let (status, _, body) = send(app, "/_peercache/scores/a%2Fb%20c").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            FetchResponse::decode(body.as_slice()).unwrap().value,
            vec![0, 255, 1]
        );
    }

    #[tokio::test]
    async fn test_peer_endpoint_unknown_group() {
        let app = create_peer_router(test_state(), DEFAULT_BASE_PATH);
        let (status, _, body) = send(app, "/_peercache/users/Tom").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(String::from_utf8(body).unwrap().contains("no such group: users"));
    }

    #[tokio::test]
    async fn test_peer_endpoint_loader_error() {
        let app = create_peer_router(test_state(), DEFAULT_BASE_PATH);
        let (status, _, body) = send(app, "/_peercache/scores/Sam").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(String::from_utf8(body).unwrap().contains("Sam not exist"));
    }

    #[tokio::test]
    async fn test_peer_endpoint_custom_base_path() {
        let app = create_peer_router(test_state(), "/cache/");
        let (status, _, _) = send(app.clone(), "/cache/scores/Tom").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = send(app, "/_peercache/scores/Tom").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_endpoint() {
        let app = create_api_router(test_state());
        let (status, _, body) = send(app, "/api?key=Tom").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["group"], "scores");
        assert_eq!(json["value"], "630");
    }

    #[tokio::test]
    async fn test_api_missing_key() {
        let app = create_api_router(test_state());
        let (status, _, _) = send(app, "/api").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_api_router(test_state());
        let (status, _, body) = send(app, "/stats").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["groups"][0]["group"], "scores");
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_api_router(test_state());
        let (status, _, _) = send(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
    }
}
