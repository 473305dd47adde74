//! The device aggregate and the rules that govern how it may change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use utoipa::ToSchema;

/// Lifecycle state of a device.
#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceState {
    Available,
    InUse,
    Inactive,
}

impl DeviceState {
    /// Text form used both on the wire and in the `devices.state` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceState::Available => "AVAILABLE",
            DeviceState::InUse => "IN_USE",
            DeviceState::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown device state `{0}`")]
pub struct UnknownState(pub String);

impl FromStr for DeviceState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(DeviceState::Available),
            "IN_USE" => Ok(DeviceState::InUse),
            "INACTIVE" => Ok(DeviceState::Inactive),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// Violations of the device rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Name cannot be blank")]
    BlankName,
    #[error("Brand cannot be blank")]
    BlankBrand,
    #[error("Cannot update name or brand for device in use")]
    DetailsLocked,
    #[error("Cannot delete device that is in use")]
    InUse,
}

/// A tracked device.
///
/// `id` stays `None` until the device has been persisted once. Name and brand
/// are never blank, `creation_time` is fixed at creation, and the details of a
/// device that is [`DeviceState::InUse`] cannot be edited.
///
/// A device read back from storage also remembers the state it was stored
/// with, so a write can be refused when someone else changed it meanwhile.
#[derive(Clone, Debug, PartialEq)]
pub struct Device {
    id: Option<i64>,
    name: String,
    brand: String,
    state: DeviceState,
    stored_state: Option<DeviceState>,
    creation_time: DateTime<Utc>,
}

impl Device {
    /// Build a new, not yet persisted device stamped with the current time.
    pub fn create(
        name: impl Into<String>,
        brand: impl Into<String>,
        state: DeviceState,
    ) -> Result<Self, DeviceError> {
        let name = name.into();
        let brand = brand.into();
        ensure_not_blank(&name, DeviceError::BlankName)?;
        ensure_not_blank(&brand, DeviceError::BlankBrand)?;

        Ok(Self {
            id: None,
            name,
            brand,
            state,
            stored_state: None,
            creation_time: Utc::now(),
        })
    }

    /// Rebuild a device from stored values without re-checking them.
    pub fn reconstitute(
        id: i64,
        name: String,
        brand: String,
        state: DeviceState,
        creation_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            name,
            brand,
            state,
            stored_state: Some(state),
            creation_time,
        }
    }

    pub fn update_state(&mut self, state: DeviceState) {
        self.state = state;
    }

    /// Change name and/or brand. `None` leaves the field as it is.
    ///
    /// Nothing is modified when an error is returned.
    pub fn update_details(
        &mut self,
        name: Option<&str>,
        brand: Option<&str>,
    ) -> Result<(), DeviceError> {
        if self.state == DeviceState::InUse {
            return Err(DeviceError::DetailsLocked);
        }
        if let Some(name) = name {
            ensure_not_blank(name, DeviceError::BlankName)?;
        }
        if let Some(brand) = brand {
            ensure_not_blank(brand, DeviceError::BlankBrand)?;
        }

        if let Some(name) = name {
            self.name = name.to_string();
        }
        if let Some(brand) = brand {
            self.brand = brand.to_string();
        }
        Ok(())
    }

    pub fn can_be_deleted(&self) -> bool {
        self.state != DeviceState::InUse
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// State as last read from storage; `None` for a device never persisted.
    pub fn stored_state(&self) -> Option<DeviceState> {
        self.stored_state
    }

    pub fn creation_time(&self) -> DateTime<Utc> {
        self.creation_time
    }
}

fn ensure_not_blank(value: &str, err: DeviceError) -> Result<(), DeviceError> {
    if value.trim().is_empty() {
        Err(err)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn create_sets_fields_and_timestamp() {
        let before = Utc::now();
        let device = Device::create("iPhone 15", "Apple", DeviceState::Available).unwrap();

        assert_eq!(device.id(), None);
        assert_eq!(device.name(), "iPhone 15");
        assert_eq!(device.brand(), "Apple");
        assert_eq!(device.state(), DeviceState::Available);
        assert!(device.creation_time() >= before);
        assert!(device.creation_time() <= Utc::now());
    }

    #[test]
    fn create_rejects_blank_name() {
        let err = Device::create("   ", "Apple", DeviceState::Available).unwrap_err();
        assert_eq!(err, DeviceError::BlankName);
        assert_eq!(err.to_string(), "Name cannot be blank");

        let err = Device::create("", "Apple", DeviceState::Available).unwrap_err();
        assert_eq!(err, DeviceError::BlankName);
    }

    #[test]
    fn create_rejects_blank_brand() {
        let err = Device::create("iPhone", " \t", DeviceState::Available).unwrap_err();
        assert_eq!(err, DeviceError::BlankBrand);
        assert_eq!(err.to_string(), "Brand cannot be blank");
    }

    #[test]
    fn update_state_is_always_allowed() {
        let mut device = Device::create("iPhone 15", "Apple", DeviceState::InUse).unwrap();
        device.update_state(DeviceState::Inactive);
        assert_eq!(device.state(), DeviceState::Inactive);
    }

    #[test]
    fn update_details_when_not_in_use() {
        let mut device = Device::create("iPhone 15", "Apple", DeviceState::Available).unwrap();
        device
            .update_details(Some("iPhone 15 Pro"), Some("Apple Inc"))
            .unwrap();

        assert_eq!(device.name(), "iPhone 15 Pro");
        assert_eq!(device.brand(), "Apple Inc");
    }

    #[test]
    fn update_details_keeps_absent_fields() {
        let mut device = Device::create("Pixel 8", "Google", DeviceState::Inactive).unwrap();
        device.update_details(None, Some("Alphabet")).unwrap();

        assert_eq!(device.name(), "Pixel 8");
        assert_eq!(device.brand(), "Alphabet");
    }

    #[test]
    fn update_details_refused_when_in_use() {
        let mut device = Device::create("iPhone 15", "Apple", DeviceState::InUse).unwrap();
        let err = device
            .update_details(Some("iPhone 15 Pro"), Some("Apple Inc"))
            .unwrap_err();

        assert_eq!(err, DeviceError::DetailsLocked);
        assert_eq!(
            err.to_string(),
            "Cannot update name or brand for device in use"
        );
        assert_eq!(device.name(), "iPhone 15");
        assert_eq!(device.brand(), "Apple");
    }

    #[test]
    fn update_details_is_all_or_nothing() {
        let mut device = Device::create("iPhone 15", "Apple", DeviceState::Available).unwrap();
        let err = device
            .update_details(Some("iPhone 16"), Some("  "))
            .unwrap_err();

        assert_eq!(err, DeviceError::BlankBrand);
        assert_eq!(device.name(), "iPhone 15");
    }

    #[test]
    fn deletion_depends_on_state() {
        let available = Device::create("iPhone 15", "Apple", DeviceState::Available).unwrap();
        let in_use = Device::create("iPhone 15", "Apple", DeviceState::InUse).unwrap();

        assert!(available.can_be_deleted());
        assert!(!in_use.can_be_deleted());
    }

    #[test]
    fn reconstitute_keeps_stored_values() {
        let created = Utc::now() - Duration::days(1);
        let device = Device::reconstitute(
            1,
            "iPhone 15".into(),
            "Apple".into(),
            DeviceState::Available,
            created,
        );

        assert_eq!(device.id(), Some(1));
        assert_eq!(device.name(), "iPhone 15");
        assert_eq!(device.creation_time(), created);
        assert_eq!(device.stored_state(), Some(DeviceState::Available));
    }

    #[test]
    fn stored_state_survives_local_changes() {
        let mut device = Device::reconstitute(
            4,
            "Pixel 8".into(),
            "Google".into(),
            DeviceState::Available,
            Utc::now(),
        );
        device.update_state(DeviceState::InUse);

        assert_eq!(device.state(), DeviceState::InUse);
        assert_eq!(device.stored_state(), Some(DeviceState::Available));

        let fresh = Device::create("Pixel 8", "Google", DeviceState::Available).unwrap();
        assert_eq!(fresh.stored_state(), None);
    }

    #[test]
    fn state_text_form_matches_serde() {
        for state in [
            DeviceState::Available,
            DeviceState::InUse,
            DeviceState::Inactive,
        ] {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{}\"", state.as_str()));
            assert_eq!(state.as_str().parse::<DeviceState>().unwrap(), state);
        }
        assert!("MAINTENANCE".parse::<DeviceState>().is_err());
    }
}
