//! Defines routes for the devices API.
//!
//! ## Structure
//! - **Device endpoints**
//!   - `POST   /api/v1/devices`      — create device
//!   - `GET    /api/v1/devices`      — list devices (supports brand, state)
//!   - `GET    /api/v1/devices/{id}` — fetch one device
//!   - `PUT    /api/v1/devices/{id}` — partial update
//!   - `DELETE /api/v1/devices/{id}` — delete device
//!
//! - **Operational endpoints**
//!   - `GET /q/health`, `/q/health/live`, `/q/health/ready`
//!   - `GET /q/openapi` — OpenAPI document as JSON

use crate::{
    handlers::{
        device_handlers::{create_device, delete_device, get_device, list_devices, update_device},
        health_handlers::{health, live, ready},
    },
    openapi::openapi_json,
    services::device_service::DeviceService,
};
use axum::{Router, routing::get};

/// Build the router carrying `DeviceService` as shared state.
pub fn routes() -> Router<DeviceService> {
    Router::new()
        .route("/q/health", get(health))
        .route("/q/health/live", get(live))
        .route("/q/health/ready", get(ready))
        .route("/q/openapi", get(openapi_json))
        .route("/api/v1/devices", get(list_devices).post(create_device))
        .route(
            "/api/v1/devices/{id}",
            get(get_device).put(update_device).delete(delete_device),
        )
}
