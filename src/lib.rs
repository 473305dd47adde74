//! Device inventory REST service backed by SQLite.

use axum::{Router, http::HeaderName};
use std::sync::Arc;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod services;

use services::{
    device_repository::SqliteDeviceRepository, device_service::DeviceService,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Embedded schema migrations from `migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Wire the SQLite repository into a service.
pub fn sqlite_service(db: Arc<sqlx::SqlitePool>) -> DeviceService {
    DeviceService::new(Arc::new(SqliteDeviceRepository::new(db)))
}

/// Full application router: routes plus tracing and request-id layers.
pub fn build_app(service: DeviceService) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    routes::routes::routes()
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(service)
}
