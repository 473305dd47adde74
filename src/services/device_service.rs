//! DeviceService — the device use cases (create, get, update, list, delete).
//!
//! Request payloads are validated here, domain rules are enforced by
//! [`Device`], and storage goes through a [`DeviceRepository`]. Handlers only
//! translate HTTP to these calls.

use crate::{
    models::{
        device::{Device, DeviceError, DeviceState},
        dto::{CreateDeviceRequest, DeviceResponse, UpdateDeviceRequest, validation_message},
    },
    services::device_repository::{DeviceRepository, RepositoryError},
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use validator::Validate;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Device not found with id: {0}")]
    NotFound(i64),
    #[error("{0}")]
    Validation(String),
    #[error("Device {0} was modified by another request, please retry")]
    Conflict(i64),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<DeviceError> for ServiceError {
    fn from(err: DeviceError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Clone)]
pub struct DeviceService {
    repo: Arc<dyn DeviceRepository>,
}

impl DeviceService {
    pub fn new(repo: Arc<dyn DeviceRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, request: CreateDeviceRequest) -> ServiceResult<DeviceResponse> {
        request
            .validate()
            .map_err(|errors| ServiceError::Validation(validation_message(&errors)))?;
        let (Some(name), Some(brand), Some(state)) = (request.name, request.brand, request.state)
        else {
            return Err(ServiceError::Validation(
                "Name, brand and state are required".into(),
            ));
        };

        let device = Device::create(name, brand, state)?;
        let saved = self.repo.save(device).await?;
        debug!(id = ?saved.id(), "created device");

        Ok(saved.into())
    }

    pub async fn get(&self, id: i64) -> ServiceResult<DeviceResponse> {
        Ok(self.load(id).await?.into())
    }

    /// Apply a partial update.
    ///
    /// Name and brand are applied before the state, so a request touching the
    /// details of a device currently in use is refused as a whole. The write
    /// is refused with [`ServiceError::Conflict`] if the stored state changed
    /// after the device was loaded.
    pub async fn update(
        &self,
        id: i64,
        request: UpdateDeviceRequest,
    ) -> ServiceResult<DeviceResponse> {
        let mut device = self.load(id).await?;

        if request.name.is_some() || request.brand.is_some() {
            device.update_details(request.name.as_deref(), request.brand.as_deref())?;
        }
        if let Some(state) = request.state {
            device.update_state(state);
        }

        let saved = self.repo.save(device).await.map_err(|err| match err {
            RepositoryError::Missing(id) => ServiceError::NotFound(id),
            RepositoryError::Conflict(id) => ServiceError::Conflict(id),
            other => other.into(),
        })?;
        Ok(saved.into())
    }

    /// List devices. A non-blank brand takes precedence over the state filter.
    pub async fn list(
        &self,
        brand: Option<&str>,
        state: Option<DeviceState>,
    ) -> ServiceResult<Vec<DeviceResponse>> {
        let devices = match (brand.filter(|b| !b.trim().is_empty()), state) {
            (Some(brand), _) => self.repo.find_by_brand(brand).await?,
            (None, Some(state)) => self.repo.find_by_state(state).await?,
            (None, None) => self.repo.find_all().await?,
        };

        Ok(devices.into_iter().map(DeviceResponse::from).collect())
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        let device = self.load(id).await?;
        if !device.can_be_deleted() {
            return Err(DeviceError::InUse.into());
        }
        // the device may have been taken into use since it was loaded
        self.repo.delete(&device).await.map_err(|err| match err {
            RepositoryError::InUse(_) => ServiceError::from(DeviceError::InUse),
            other => ServiceError::from(other),
        })?;
        debug!(id, "deleted device");
        Ok(())
    }

    /// Readiness probe hook; checks the repository is reachable.
    pub async fn ping(&self) -> ServiceResult<()> {
        self.repo.ping().await?;
        Ok(())
    }

    async fn load(&self, id: i64) -> ServiceResult<Device> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }
}
