//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use qiblahub_core::clock::Clock;
use qiblahub_compass::KAABA;
use qiblahub_store::MemoryDocumentStore;
use qiblahub_test_support::FixedClock;
use tower::ServiceExt;

use qiblahub_api::build_router;
use qiblahub_api::extract::PARTICIPANT_HEADER;
use qiblahub_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Build the full app router over an in-memory store and a fixed clock.
pub async fn build_test_app() -> Router {
    build_test_app_with_store().await.0
}

/// Like [`build_test_app`], also returning the store so tests can take it
/// offline or inspect it.
pub async fn build_test_app_with_store() -> (Router, Arc<MemoryDocumentStore>) {
    let store = Arc::new(MemoryDocumentStore::new());
    let app_state = AppState::open(store.clone(), fixed_clock(), KAABA)
        .await
        .unwrap();
    (build_router(app_state), store)
}

fn request(method: &str, uri: &str, participant: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match participant {
        Some(id) => builder.header(PARTICIPANT_HEADER, id),
        None => builder,
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    participant: Option<&str>,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = request("POST", uri, participant)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request without a body and return the response.
pub async fn post_empty(
    app: Router,
    uri: &str,
    participant: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let request = request("POST", uri, participant)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(
    app: Router,
    uri: &str,
    participant: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let request = request("GET", uri, participant)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return only the status.
pub async fn get_status(app: Router, uri: &str) -> StatusCode {
    let request = request("GET", uri, None).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap().status()
}
