//! Request routing for the gateway.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::config::Config;
use crate::handlers;
use crate::store::BlobStore;

/// Application state shared between handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn BlobStore>,
}

/// Creates the router for the gateway's four endpoints.
pub fn create_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_size);

    Router::new()
        .route("/container/create", post(handlers::create_container))
        .route("/container/view", get(handlers::view_container))
        .route(
            "/blob/create",
            post(handlers::upload_blob).layer(upload_limit),
        )
        .route("/blob/delete", delete(handlers::delete_blob))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBlobStore;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn router() -> Router {
        router_with(Config::default())
    }

    fn router_with(config: Config) -> Router {
        let store = MemoryBlobStore::new("http://127.0.0.1:3001/devstoreaccount1").unwrap();
        create_router(AppState {
            config: Arc::new(config),
            store: Arc::new(store),
        })
    }

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_create_then_view() {
        let router = router();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/container/create")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"id":"c1"}"#))
            .unwrap();
        let (status, body) = call(router.clone(), request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Container was created successfully");
        assert_eq!(body["url"], "http://127.0.0.1:3001/devstoreaccount1/c1");

        let request = Request::builder()
            .uri("/container/view?id=c1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["blobs"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/container/create")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = call(router(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_upload_without_multipart_body() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/blob/create")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"id":"c1"}"#))
            .unwrap();
        let (status, body) = call(router(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_upload_over_body_limit() {
        let upload_dir = tempfile::TempDir::new().unwrap();
        let router = router_with(Config {
            upload_dir: upload_dir.path().to_path_buf(),
            max_upload_size: 64,
            ..Config::default()
        });

        let payload = "x".repeat(1000);
        let body = format!(
            "--XBOUNDARY\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"big.bin\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {}\r\n\
             --XBOUNDARY--\r\n",
            payload
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/blob/create")
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .unwrap();
        let (status, body) = call(router, request).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["message"], "File too large");
        assert_eq!(std::fs::read_dir(upload_dir.path()).unwrap().count(), 0);
    }
}
