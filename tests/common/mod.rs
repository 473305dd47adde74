#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, header::CONTENT_TYPE};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use devices_api::{build_app, sqlite_service};

/// Build the full application router (same layers as `main.rs`) over the
/// given pool.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_app(sqlite_service(Arc::new(pool)))
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a device through the API and return its id.
pub async fn create_device(pool: &SqlitePool, name: &str, brand: &str, state: &str) -> i64 {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/devices",
        serde_json::json!({"name": name, "brand": brand, "state": state}),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["id"].as_i64().unwrap()
}
