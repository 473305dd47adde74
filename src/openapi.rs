//! OpenAPI document generated from handler annotations via utoipa.

use crate::{
    errors::ErrorResponse,
    handlers::device_handlers,
    models::{
        device::DeviceState,
        dto::{CreateDeviceRequest, DeviceResponse, UpdateDeviceRequest},
    },
};
use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Devices API",
        description = "Inventory of devices with lifecycle states."
    ),
    paths(
        device_handlers::create_device,
        device_handlers::get_device,
        device_handlers::update_device,
        device_handlers::list_devices,
        device_handlers::delete_device,
    ),
    components(schemas(
        CreateDeviceRequest,
        UpdateDeviceRequest,
        DeviceResponse,
        DeviceState,
        ErrorResponse,
    )),
    tags((name = "Devices", description = "Device management operations"))
)]
pub struct ApiDoc;

/// `GET /q/openapi`
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
