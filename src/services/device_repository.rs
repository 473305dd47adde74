//! Persistence port for devices and its SQLite implementation.
//!
//! The service only talks to [`DeviceRepository`]; the SQLite adapter maps
//! rows of the `devices` table to [`Device`] values and back.

use crate::models::device::{Device, DeviceState, UnknownState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("device {0} no longer exists")]
    Missing(i64),
    #[error("device {0} was changed since it was read")]
    Conflict(i64),
    #[error("device {0} is in use")]
    InUse(i64),
    #[error("stored device {id} is unreadable: {source}")]
    Corrupt {
        id: i64,
        #[source]
        source: UnknownState,
    },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Insert a device without an id, or overwrite name, brand and state of a
    /// stored one. Returns the device as stored.
    ///
    /// An existing row is only written while its state still matches
    /// [`Device::stored_state`]; otherwise [`RepositoryError::Conflict`].
    async fn save(&self, device: Device) -> RepositoryResult<Device>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Device>>;

    async fn find_all(&self) -> RepositoryResult<Vec<Device>>;

    async fn find_by_brand(&self, brand: &str) -> RepositoryResult<Vec<Device>>;

    async fn find_by_state(&self, state: DeviceState) -> RepositoryResult<Vec<Device>>;

    /// Remove a stored device. Removing an absent device is not an error;
    /// a row that is in use at the time of the delete is kept and reported as
    /// [`RepositoryError::InUse`].
    async fn delete(&self, device: &Device) -> RepositoryResult<()>;

    /// Round-trip to the backing store.
    async fn ping(&self) -> RepositoryResult<()>;
}

const COLUMNS: &str = "id, name, brand, state, creation_time";

/// Row shape of the `devices` table.
#[derive(FromRow, Debug)]
struct DeviceRecord {
    id: i64,
    name: String,
    brand: String,
    state: String,
    creation_time: DateTime<Utc>,
}

impl TryFrom<DeviceRecord> for Device {
    type Error = RepositoryError;

    fn try_from(row: DeviceRecord) -> Result<Self, Self::Error> {
        let state = row
            .state
            .parse::<DeviceState>()
            .map_err(|source| RepositoryError::Corrupt { id: row.id, source })?;
        Ok(Device::reconstitute(
            row.id,
            row.name,
            row.brand,
            state,
            row.creation_time,
        ))
    }
}

fn into_devices(rows: Vec<DeviceRecord>) -> RepositoryResult<Vec<Device>> {
    rows.into_iter().map(Device::try_from).collect()
}

#[derive(Clone)]
pub struct SqliteDeviceRepository {
    db: Arc<SqlitePool>,
}

impl SqliteDeviceRepository {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    async fn exists(&self, id: i64) -> RepositoryResult<bool> {
        let found = sqlx::query_scalar::<_, i64>("SELECT id FROM devices WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.db)
            .await?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl DeviceRepository for SqliteDeviceRepository {
    async fn save(&self, device: Device) -> RepositoryResult<Device> {
        let row = match device.id() {
            None => {
                let query = format!(
                    "INSERT INTO devices (name, brand, state, creation_time)
                     VALUES (?, ?, ?, ?)
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, DeviceRecord>(&query)
                    .bind(device.name())
                    .bind(device.brand())
                    .bind(device.state().as_str())
                    .bind(device.creation_time())
                    .fetch_one(&*self.db)
                    .await?
            }
            Some(id) => {
                // creation_time is never rewritten
                let query = format!(
                    "UPDATE devices SET name = ?, brand = ?, state = ?
                     WHERE id = ? AND state = ?
                     RETURNING {COLUMNS}"
                );
                let updated = sqlx::query_as::<_, DeviceRecord>(&query)
                    .bind(device.name())
                    .bind(device.brand())
                    .bind(device.state().as_str())
                    .bind(id)
                    .bind(device.stored_state().map(|s| s.as_str()))
                    .fetch_optional(&*self.db)
                    .await?;
                let Some(row) = updated else {
                    if self.exists(id).await? {
                        debug!(id, "stale write refused");
                        return Err(RepositoryError::Conflict(id));
                    }
                    return Err(RepositoryError::Missing(id));
                };
                row
            }
        };

        debug!(id = row.id, "saved device");
        Device::try_from(row)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Device>> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE id = ?");
        sqlx::query_as::<_, DeviceRecord>(&query)
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .map(Device::try_from)
            .transpose()
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Device>> {
        let query = format!("SELECT {COLUMNS} FROM devices ORDER BY id ASC");
        let rows = sqlx::query_as::<_, DeviceRecord>(&query)
            .fetch_all(&*self.db)
            .await?;
        into_devices(rows)
    }

    async fn find_by_brand(&self, brand: &str) -> RepositoryResult<Vec<Device>> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE brand = ? ORDER BY id ASC");
        let rows = sqlx::query_as::<_, DeviceRecord>(&query)
            .bind(brand)
            .fetch_all(&*self.db)
            .await?;
        into_devices(rows)
    }

    async fn find_by_state(&self, state: DeviceState) -> RepositoryResult<Vec<Device>> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE state = ? ORDER BY id ASC");
        let rows = sqlx::query_as::<_, DeviceRecord>(&query)
            .bind(state.as_str())
            .fetch_all(&*self.db)
            .await?;
        into_devices(rows)
    }

    async fn delete(&self, device: &Device) -> RepositoryResult<()> {
        let Some(id) = device.id() else {
            return Ok(());
        };
        let result = sqlx::query("DELETE FROM devices WHERE id = ? AND state <> ?")
            .bind(id)
            .bind(DeviceState::InUse.as_str())
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            if self.exists(id).await? {
                return Err(RepositoryError::InUse(id));
            }
            debug!(id, "device already gone");
        }
        Ok(())
    }

    async fn ping(&self) -> RepositoryResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.db)
            .await?;
        Ok(())
    }
}
