//! Request and response payloads of the devices API.

use crate::models::device::{Device, DeviceState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

/// Body of `POST /api/v1/devices`.
///
/// A missing field, an explicit `null` and `""` all fail validation with the
/// same "is required" message.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDeviceRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, message = "Name is required")
    )]
    #[schema(example = "iPhone 15")]
    pub name: Option<String>,

    #[validate(
        required(message = "Brand is required"),
        length(min = 1, message = "Brand is required")
    )]
    #[schema(example = "Apple")]
    pub brand: Option<String>,

    #[validate(required(message = "State is required"))]
    pub state: Option<DeviceState>,
}

/// Body of `PUT /api/v1/devices/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateDeviceRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub state: Option<DeviceState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub state: DeviceState,
    pub creation_time: DateTime<Utc>,
}

impl From<Device> for DeviceResponse {
    fn from(device: Device) -> Self {
        Self {
            // only persisted devices are ever turned into responses
            id: device.id().unwrap_or_default(),
            name: device.name().to_string(),
            brand: device.brand().to_string(),
            state: device.state(),
            creation_time: device.creation_time(),
        }
    }
}

/// Filters for `GET /api/v1/devices`. A non-blank `brand` wins over `state`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListDevicesQuery {
    /// Filter by brand name
    pub brand: Option<String>,
    /// Filter by device state
    pub state: Option<DeviceState>,
}

/// Flatten validator output into one human readable line.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}
