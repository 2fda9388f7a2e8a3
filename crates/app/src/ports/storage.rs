//! Storage port: repository trait for device persistence.

use std::future::Future;

use devicehub_domain::device::{Device, DeviceState};
use devicehub_domain::error::DeviceHubError;
use devicehub_domain::id::DeviceId;
use devicehub_domain::page::{Page, PageRequest};

/// Optional constraints applied when listing devices.
///
/// A `None` field places no constraint on that attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    pub brand: Option<String>,
    pub state: Option<DeviceState>,
}

/// Repository for persisting and querying [`Device`]s.
pub trait DeviceRepository {
    /// Persist a device.
    ///
    /// A device without an id is inserted and returned with the id storage
    /// assigned; a device with an id overwrites the stored row.
    fn save(&self, device: Device) -> impl Future<Output = Result<Device, DeviceHubError>> + Send;

    /// Get a device by its identifier; `None` when absent.
    fn find_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, DeviceHubError>> + Send;

    /// Get one page of the devices matching `filter`, ordered by id.
    fn find_all(
        &self,
        filter: DeviceFilter,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<Device>, DeviceHubError>> + Send;

    /// Delete a device by its identifier.
    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), DeviceHubError>> + Send;
}
