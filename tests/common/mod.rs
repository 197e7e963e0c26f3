#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, Response, StatusCode,
    },
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use farmhub::{app::build_app, state::AppState, users::memory::MemoryUserRepository};

/// Router over a fresh in-memory store.
pub fn test_app() -> Router {
    build_app(AppState::fake())
}

/// Router plus a handle on its store, for tests that need to reach behind
/// the API (promote a user, delete one).
pub fn test_app_with_store() -> (Router, Arc<MemoryUserRepository>) {
    let store = Arc::new(MemoryUserRepository::new());
    (build_app(AppState::fake_with(store.clone())), store)
}

/// The canonical registration used across the suite.
pub fn scenario() -> Value {
    json!({
        "fullName": "A",
        "email": "a@x.com",
        "password": "p",
        "phone": "1",
        "language": "en",
        "farmName": "F",
        "farmLocation": "L",
        "farmSize": 5,
        "primaryCrops": "Wheat",
        "sprayerType": "Manual",
        "iotDevices": 1,
        "machinery": "Tractor",
        "pesticides": "X",
        "fertilizerPreference": "Organic",
        "monthlyExpenditure": "100"
    })
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(v) => req
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    app.oneshot(req).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn post_raw(app: Router, uri: &str, raw: &'static str) -> Response<Body> {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(raw))
        .unwrap();
    app.oneshot(req).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers the scenario user and returns `(status, body)`.
pub async fn register(app: Router, body: Value) -> (StatusCode, Value) {
    let res = post_json(app, "/api/register", body).await;
    let status = res.status();
    (status, body_json(res).await)
}
