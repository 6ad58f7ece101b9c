//! Shared helpers for API integration tests: an app wired to the in-memory
//! backend plus small request/response utilities.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use calendar_api::config::ApiConfig;
use calendar_api::router::build_app_router;
use calendar_api::state::AppState;
use calendar_core::CalendarService;
use calendar_db::{MemoryStore, StorageBackend};

/// Actor id the test service stamps onto writes.
pub const TEST_CREATOR_ID: i64 = 42;

/// Build the application router backed by a fresh in-memory store.
pub fn build_test_app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(CalendarService::new(store, TEST_CREATOR_ID));

    let config = ApiConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 5,
        storage_backend: StorageBackend::Memory,
        database_url: None,
        creator_id: TEST_CREATOR_ID,
    };

    build_app_router(AppState { service }, &config)
}

/// Send a request with an optional JSON body and return the raw response.
pub async fn send(
    app: Router,
    method: Method,
    path: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, path: &str) -> Response<Body> {
    send(app, Method::GET, path, None).await
}

pub async fn post_json(app: Router, path: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, path, Some(json)).await
}

pub async fn put_json(app: Router, path: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, path, Some(json)).await
}

pub async fn delete(app: Router, path: &str) -> Response<Body> {
    send(app, Method::DELETE, path, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
