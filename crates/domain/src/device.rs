//! Device: the managed resource and its lifecycle.
//!
//! A [`Device`] owns every invariant that concerns it. Mutations go through
//! methods that refuse to run when the device is [`DeviceState::InUse`], so
//! callers cannot forget the rule.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConflictError, DeviceHubError, ValidationError};
use crate::id::DeviceId;
use crate::time::{self, Timestamp};

/// Current usage status of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceState {
    #[default]
    Available,
    InUse,
    Inactive,
}

impl DeviceState {
    /// Canonical upper-case name, as stored and serialized.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::InUse => "IN_USE",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceState {
    type Err = ValidationError;

    /// Parse a state name, ignoring ASCII case (`"in_use"` is accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(Self::Available),
            "IN_USE" => Ok(Self::InUse),
            "INACTIVE" => Ok(Self::Inactive),
            _ => Err(ValidationError::UnknownState(s.to_string())),
        }
    }
}

/// A device managed by the hub.
///
/// Fields are private: a fresh device is built with [`Device::new`], a stored
/// one is rebuilt with [`Device::rehydrate`]. Equality is identity equality
/// on [`id`](Self::id); devices that were never persisted are never equal.
#[derive(Debug, Clone, Serialize)]
pub struct Device {
    id: Option<DeviceId>,
    name: Option<String>,
    brand: Option<String>,
    state: DeviceState,
    created_at: Timestamp,
}

fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn provided_str(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl Device {
    /// Construct a new, not yet persisted device.
    ///
    /// Blank `name` or `brand` values are left unset. The state starts as
    /// [`DeviceState::Available`] and `created_at` is stamped now.
    #[must_use]
    pub fn new(name: Option<String>, brand: Option<String>) -> Self {
        Self {
            id: None,
            name: provided(name),
            brand: provided(brand),
            state: DeviceState::Available,
            created_at: time::now(),
        }
    }

    /// Rebuild a previously persisted device verbatim.
    ///
    /// Only storage adapters should call this: no defaults are applied and
    /// no invariant is re-checked.
    #[must_use]
    pub fn rehydrate(
        id: DeviceId,
        name: Option<String>,
        brand: Option<String>,
        state: DeviceState,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: Some(id),
            name,
            brand,
            state,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<DeviceId> {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.state
    }

    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Whether the device is currently [`DeviceState::InUse`].
    #[must_use]
    pub fn is_in_use(&self) -> bool {
        self.state == DeviceState::InUse
    }

    /// Move the device to `new_state`.
    ///
    /// Any state may follow any other; only an absent target is refused.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::MissingState`] when `new_state` is `None`.
    pub fn change_state(&mut self, new_state: Option<DeviceState>) -> Result<(), DeviceHubError> {
        let Some(new_state) = new_state else {
            return Err(ConflictError::MissingState.into());
        };
        self.state = new_state;
        Ok(())
    }

    /// Replace `name` and/or `brand`.
    ///
    /// Each value is applied only when present and not blank, so the same
    /// method serves full and partial updates.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::InUse`] when the device is in use; nothing is
    /// changed in that case.
    pub fn update_details(
        &mut self,
        name: Option<&str>,
        brand: Option<&str>,
    ) -> Result<(), DeviceHubError> {
        if self.is_in_use() {
            return Err(ConflictError::InUse {
                action: "update name or brand",
            }
            .into());
        }
        if let Some(name) = provided_str(name) {
            self.name = Some(name.to_string());
        }
        if let Some(brand) = provided_str(brand) {
            self.brand = Some(brand.to_string());
        }
        Ok(())
    }

    /// Check that the device may be removed.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::InUse`] when the device is in use.
    pub fn ensure_can_be_deleted(&self) -> Result<(), DeviceHubError> {
        if self.is_in_use() {
            return Err(ConflictError::InUse {
                action: "delete device",
            }
            .into());
        }
        Ok(())
    }

    /// Record the identifier storage assigned on first save.
    ///
    /// Reserved for repository implementations.
    pub fn assign_id(&mut self, id: DeviceId) {
        self.id = Some(id);
    }
}

impl PartialEq for Device {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
