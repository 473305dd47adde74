//! HTTP handlers for `/api/v1/devices`.
//!
//! Extractor rejections are taken as `Result`s so malformed input comes back
//! in the same JSON error shape as every other failure. All business logic
//! lives in `DeviceService`.

use crate::{
    errors::{AppError, ErrorResponse},
    models::dto::{CreateDeviceRequest, DeviceResponse, ListDevicesQuery, UpdateDeviceRequest},
    services::device_service::DeviceService,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use tracing::info;

/// Create a new device
///
/// Creates a new device with the provided information.
#[utoipa::path(
    post,
    path = "/api/v1/devices",
    tag = "Devices",
    request_body = CreateDeviceRequest,
    responses(
        (status = 201, description = "Device created successfully", body = DeviceResponse),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
    )
)]
pub async fn create_device(
    State(service): State<DeviceService>,
    payload: Result<Json<CreateDeviceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DeviceResponse>), AppError> {
    info!("POST /api/v1/devices - Creating device");
    let Json(request) = payload?;
    let device = service.create(request).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// Get device by ID
///
/// Retrieves a device by its unique identifier.
#[utoipa::path(
    get,
    path = "/api/v1/devices/{id}",
    tag = "Devices",
    params(("id" = i64, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Device found", body = DeviceResponse),
        (status = 404, description = "Device not found", body = ErrorResponse),
    )
)]
pub async fn get_device(
    State(service): State<DeviceService>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeviceResponse>, AppError> {
    let Path(id) = path?;
    info!("GET /api/v1/devices/{} - Fetching device", id);
    Ok(Json(service.get(id).await?))
}

/// Update device
///
/// Updates an existing device with the provided information. Name and brand
/// of a device that is in use cannot be changed.
#[utoipa::path(
    put,
    path = "/api/v1/devices/{id}",
    tag = "Devices",
    params(("id" = i64, Path, description = "Device ID")),
    request_body = UpdateDeviceRequest,
    responses(
        (status = 200, description = "Device updated successfully", body = DeviceResponse),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 404, description = "Device not found", body = ErrorResponse),
        (status = 409, description = "Device changed by another request", body = ErrorResponse),
    )
)]
pub async fn update_device(
    State(service): State<DeviceService>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateDeviceRequest>, JsonRejection>,
) -> Result<Json<DeviceResponse>, AppError> {
    let Path(id) = path?;
    info!("PUT /api/v1/devices/{} - Updating device", id);
    let Json(request) = payload?;
    Ok(Json(service.update(id, request).await?))
}

/// List all devices
///
/// Retrieves all devices, optionally filtered by brand or state. When both
/// are given the brand filter is used.
#[utoipa::path(
    get,
    path = "/api/v1/devices",
    tag = "Devices",
    params(ListDevicesQuery),
    responses(
        (status = 200, description = "List of devices retrieved successfully", body = Vec<DeviceResponse>),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
    )
)]
pub async fn list_devices(
    State(service): State<DeviceService>,
    query: Result<Query<ListDevicesQuery>, QueryRejection>,
) -> Result<Json<Vec<DeviceResponse>>, AppError> {
    info!("GET /api/v1/devices - Listing devices");
    let Query(filter) = query?;
    let devices = service.list(filter.brand.as_deref(), filter.state).await?;
    Ok(Json(devices))
}

/// Delete device
///
/// Deletes a device by its unique identifier. Devices in use cannot be deleted.
#[utoipa::path(
    delete,
    path = "/api/v1/devices/{id}",
    tag = "Devices",
    params(("id" = i64, Path, description = "Device ID")),
    responses(
        (status = 204, description = "Device deleted successfully"),
        (status = 400, description = "Device is in use", body = ErrorResponse),
        (status = 404, description = "Device not found", body = ErrorResponse),
    )
)]
pub async fn delete_device(
    State(service): State<DeviceService>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = path?;
    info!("DELETE /api/v1/devices/{} - Deleting device", id);
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
