//! Device service: use-cases for managing devices.
//!
//! The service sequences validation, lookup, domain mutation and
//! persistence. Business rules themselves live on
//! [`Device`](devicehub_domain::device::Device); this layer decides the order
//! they are applied in and turns repository misses into not-found errors.

use devicehub_domain::device::{Device, DeviceState};
use devicehub_domain::error::{DeviceHubError, NotFoundError};
use devicehub_domain::id::DeviceId;
use devicehub_domain::page::{Page, PageRequest};

use crate::ports::{DeviceFilter, DeviceRepository};
use crate::validation::{self, DeviceAttributesValidator};

/// Optional attribute changes carried by full and partial updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceChanges {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub state: Option<DeviceState>,
}

impl DeviceChanges {
    fn touches_details(&self) -> bool {
        let provided = |value: Option<&str>| value.is_some_and(|v| !v.trim().is_empty());
        provided(self.name.as_deref()) || provided(self.brand.as_deref())
    }
}

/// Application service for device operations.
pub struct DeviceService<R> {
    repo: R,
    validators: Vec<Box<dyn DeviceAttributesValidator>>,
}

impl<R: DeviceRepository> DeviceService<R> {
    /// Create a new service backed by `repo`.
    ///
    /// `validators` run in the given order before every creation.
    pub fn new(repo: R, validators: Vec<Box<dyn DeviceAttributesValidator>>) -> Self {
        Self { repo, validators }
    }

    /// Validate the attributes, then create and persist a new device.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::Validation`] if a validator rejects the
    /// attributes (nothing is saved), or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn create_device(
        &self,
        name: Option<String>,
        brand: Option<String>,
    ) -> Result<Device, DeviceHubError> {
        validation::run_all(&self.validators, name.as_deref(), brand.as_deref())?;
        let created = self.repo.save(Device::new(name, brand)).await?;
        tracing::info!(device_id = ?created.id(), "device created");
        Ok(created)
    }

    /// Look up a device by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::NotFound`] when no device with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_device(&self, id: DeviceId) -> Result<Device, DeviceHubError> {
        self.repo.find_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List one page of devices, optionally filtered by brand and state.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn list_devices(
        &self,
        filter: DeviceFilter,
        page: PageRequest,
    ) -> Result<Page<Device>, DeviceHubError> {
        self.repo.find_all(filter, page).await
    }

    /// Replace the details and state of a device.
    ///
    /// Details are applied before the state, so moving a device into
    /// `IN_USE` does not block the rename sent in the same call. The target
    /// state is mandatory.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::NotFound`] for an unknown id,
    /// [`DeviceHubError::Conflict`] when the device is in use or `state` is
    /// missing, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn update_device(
        &self,
        id: DeviceId,
        changes: DeviceChanges,
    ) -> Result<Device, DeviceHubError> {
        let mut device = self.get_device(id).await?;
        device
            .update_details(changes.name.as_deref(), changes.brand.as_deref())
            .inspect_err(|err| tracing::debug!(error = %err, "update refused"))?;
        device
            .change_state(changes.state)
            .inspect_err(|err| tracing::debug!(error = %err, "update refused"))?;
        let saved = self.repo.save(device).await?;
        tracing::info!(state = %saved.state(), "device updated");
        Ok(saved)
    }

    /// Apply only the provided changes to a device.
    ///
    /// Details are touched only when a non-blank name or brand is given, and
    /// the state only when it differs from the current one. The device is
    /// saved even when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::NotFound`] for an unknown id,
    /// [`DeviceHubError::Conflict`] when details are changed on a device in
    /// use, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn patch_device(
        &self,
        id: DeviceId,
        changes: DeviceChanges,
    ) -> Result<Device, DeviceHubError> {
        let mut device = self.get_device(id).await?;
        if changes.touches_details() {
            device
                .update_details(changes.name.as_deref(), changes.brand.as_deref())
                .inspect_err(|err| tracing::debug!(error = %err, "patch refused"))?;
        }
        if changes.state.is_some_and(|state| state != device.state()) {
            device.change_state(changes.state)?;
        }
        let saved = self.repo.save(device).await?;
        tracing::info!(state = %saved.state(), "device patched");
        Ok(saved)
    }

    /// Delete a device that is not in use.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::NotFound`] for an unknown id,
    /// [`DeviceHubError::Conflict`] when the device is in use, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_device(&self, id: DeviceId) -> Result<(), DeviceHubError> {
        let device = self.get_device(id).await?;
        device
            .ensure_can_be_deleted()
            .inspect_err(|err| tracing::debug!(error = %err, "delete refused"))?;
        self.repo.delete(id).await?;
        tracing::info!("device deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::NameBrandValidator;
    use devicehub_domain::error::{ConflictError, ValidationError};
    use std::collections::BTreeMap;
    use std::future::Future;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct InMemoryDeviceRepo {
        store: Mutex<BTreeMap<DeviceId, Device>>,
        next_id: Mutex<i64>,
        saves: AtomicUsize,
    }

    impl DeviceRepository for InMemoryDeviceRepo {
        fn save(
            &self,
            mut device: Device,
        ) -> impl Future<Output = Result<Device, DeviceHubError>> + Send {
            self.saves.fetch_add(1, Ordering::SeqCst);
            let id = device.id().unwrap_or_else(|| {
                let mut next = self.next_id.lock().unwrap();
                *next += 1;
                DeviceId::new(*next)
            });
            device.assign_id(id);
            self.store.lock().unwrap().insert(id, device.clone());
            async { Ok(device) }
        }

        fn find_by_id(
            &self,
            id: DeviceId,
        ) -> impl Future<Output = Result<Option<Device>, DeviceHubError>> + Send {
            let result = self.store.lock().unwrap().get(&id).cloned();
            async { Ok(result) }
        }

        fn find_all(
            &self,
            filter: DeviceFilter,
            page: PageRequest,
        ) -> impl Future<Output = Result<Page<Device>, DeviceHubError>> + Send {
            let store = self.store.lock().unwrap();
            let matching: Vec<Device> = store
                .values()
                .filter(|d| matches_filter(&filter, d))
                .cloned()
                .collect();
            let total = matching.len() as u64;
            let items = matching
                .into_iter()
                .skip(usize::try_from(page.offset()).unwrap())
                .take(page.size() as usize)
                .collect();
            let result = Page::new(items, page, total);
            async { Ok(result) }
        }

        fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), DeviceHubError>> + Send {
            self.store.lock().unwrap().remove(&id);
            async { Ok(()) }
        }
    }

    fn matches_filter(filter: &DeviceFilter, device: &Device) -> bool {
        filter
            .brand
            .as_deref()
            .is_none_or(|brand| device.brand() == Some(brand))
            && filter.state.is_none_or(|state| device.state() == state)
    }

    fn make_service() -> DeviceService<InMemoryDeviceRepo> {
        DeviceService::new(
            InMemoryDeviceRepo::default(),
            vec![Box::new(NameBrandValidator)],
        )
    }

    fn saves(svc: &DeviceService<InMemoryDeviceRepo>) -> usize {
        svc.repo.saves.load(Ordering::SeqCst)
    }

    fn some(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    async fn create(svc: &DeviceService<InMemoryDeviceRepo>, name: &str, brand: &str) -> DeviceId {
        svc.create_device(some(name), some(brand))
            .await
            .unwrap()
            .id()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_available_device_with_id_when_valid() {
        let svc = make_service();
        let created = svc.create_device(some("Pixel 9"), some("Google")).await.unwrap();

        assert!(created.id().is_some());
        assert_eq!(created.state(), DeviceState::Available);
        assert_eq!(created.name(), Some("Pixel 9"));
        assert_eq!(created.brand(), Some("Google"));
    }

    #[tokio::test]
    async fn should_reject_create_without_saving_when_attributes_missing() {
        let svc = make_service();
        for (name, brand) in [(None, some("B")), (some("A"), None), (some(""), some("B"))] {
            let result = svc.create_device(name, brand).await;
            assert!(matches!(
                result,
                Err(DeviceHubError::Validation(
                    ValidationError::MissingNameOrBrand
                ))
            ));
        }
        assert_eq!(saves(&svc), 0);
    }

    #[tokio::test]
    async fn should_return_not_found_when_device_missing() {
        let svc = make_service();
        let result = svc.get_device(DeviceId::new(404)).await;
        assert!(matches!(result, Err(DeviceHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_list_filtered_page_of_devices() {
        let svc = make_service();
        create(&svc, "Pixel 8", "Google").await;
        let in_use = create(&svc, "Pixel 9", "Google").await;
        create(&svc, "iPhone", "Apple").await;
        svc.update_device(
            in_use,
            DeviceChanges {
                state: Some(DeviceState::InUse),
                ..DeviceChanges::default()
            },
        )
        .await
        .unwrap();

        let google = svc
            .list_devices(
                DeviceFilter {
                    brand: some("Google"),
                    state: None,
                },
                PageRequest::new(0, 10).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(google.total_elements, 2);

        let google_in_use = svc
            .list_devices(
                DeviceFilter {
                    brand: some("Google"),
                    state: Some(DeviceState::InUse),
                },
                PageRequest::new(0, 10).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(google_in_use.items.len(), 1);
        assert_eq!(google_in_use.items[0].id(), Some(in_use));

        let second_page = svc
            .list_devices(DeviceFilter::default(), PageRequest::new(1, 2).unwrap())
            .await
            .unwrap();
        assert_eq!(second_page.items.len(), 1);
        assert_eq!(second_page.total_elements, 3);
        assert_eq!(second_page.total_pages, 2);
    }

    #[tokio::test]
    async fn should_apply_details_before_state_on_full_update() {
        let svc = make_service();
        let id = create(&svc, "Pixel 9", "Google").await;

        let updated = svc
            .update_device(
                id,
                DeviceChanges {
                    name: some("Pixel 9 Pro"),
                    brand: some("Google"),
                    state: Some(DeviceState::InUse),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name(), Some("Pixel 9 Pro"));
        assert_eq!(updated.state(), DeviceState::InUse);
    }

    #[tokio::test]
    async fn should_reject_full_update_without_state() {
        let svc = make_service();
        let id = create(&svc, "A", "B").await;

        let result = svc
            .update_device(
                id,
                DeviceChanges {
                    name: some("C"),
                    ..DeviceChanges::default()
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(DeviceHubError::Conflict(ConflictError::MissingState))
        ));
        assert_eq!(svc.get_device(id).await.unwrap().name(), Some("A"));
    }

    #[tokio::test]
    async fn should_reject_patch_of_details_when_in_use() {
        let svc = make_service();
        let id = create(&svc, "Pixel 9", "Google").await;
        svc.update_device(
            id,
            DeviceChanges {
                name: some("Pixel 9 Pro"),
                brand: some("Google"),
                state: Some(DeviceState::InUse),
            },
        )
        .await
        .unwrap();

        let result = svc
            .patch_device(
                id,
                DeviceChanges {
                    name: some("X"),
                    ..DeviceChanges::default()
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(DeviceHubError::Conflict(ConflictError::InUse { .. }))
        ));
        assert_eq!(svc.get_device(id).await.unwrap().name(), Some("Pixel 9 Pro"));
    }

    #[tokio::test]
    async fn should_reject_full_update_when_in_use_even_with_state_only() {
        let svc = make_service();
        let id = create(&svc, "A", "B").await;
        svc.patch_device(
            id,
            DeviceChanges {
                state: Some(DeviceState::InUse),
                ..DeviceChanges::default()
            },
        )
        .await
        .unwrap();
        let saves_before = saves(&svc);

        let result = svc
            .update_device(
                id,
                DeviceChanges {
                    state: Some(DeviceState::Available),
                    ..DeviceChanges::default()
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(DeviceHubError::Conflict(ConflictError::InUse { .. }))
        ));
        assert_eq!(saves(&svc), saves_before);
        assert_eq!(svc.get_device(id).await.unwrap().state(), DeviceState::InUse);
    }

    #[tokio::test]
    async fn should_ignore_blank_name_when_patching_device_in_use() {
        let svc = make_service();
        let id = create(&svc, "A", "B").await;
        svc.patch_device(
            id,
            DeviceChanges {
                state: Some(DeviceState::InUse),
                ..DeviceChanges::default()
            },
        )
        .await
        .unwrap();

        let patched = svc
            .patch_device(
                id,
                DeviceChanges {
                    name: some("   "),
                    ..DeviceChanges::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(patched.name(), Some("A"));
        assert_eq!(patched.state(), DeviceState::InUse);
    }

    #[tokio::test]
    async fn should_allow_patching_state_of_device_in_use() {
        let svc = make_service();
        let id = create(&svc, "A", "B").await;
        svc.patch_device(
            id,
            DeviceChanges {
                state: Some(DeviceState::InUse),
                ..DeviceChanges::default()
            },
        )
        .await
        .unwrap();

        let patched = svc
            .patch_device(
                id,
                DeviceChanges {
                    state: Some(DeviceState::Available),
                    ..DeviceChanges::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.state(), DeviceState::Available);
    }

    #[tokio::test]
    async fn should_save_once_when_patch_changes_nothing() {
        let svc = make_service();
        let id = create(&svc, "A", "B").await;
        let before = svc.get_device(id).await.unwrap();
        let saves_before = saves(&svc);

        let patched = svc.patch_device(id, DeviceChanges::default()).await.unwrap();

        assert_eq!(saves(&svc), saves_before + 1);
        assert_eq!(patched.name(), before.name());
        assert_eq!(patched.brand(), before.brand());
        assert_eq!(patched.state(), before.state());
        assert_eq!(patched.created_at(), before.created_at());
    }

    #[tokio::test]
    async fn should_return_not_found_when_patching_unknown_device() {
        let svc = make_service();
        let result = svc
            .patch_device(DeviceId::new(7), DeviceChanges::default())
            .await;
        assert!(matches!(result, Err(DeviceHubError::NotFound(_))));
        assert_eq!(saves(&svc), 0);
    }

    #[tokio::test]
    async fn should_delete_available_device() {
        let svc = make_service();
        let id = create(&svc, "A", "B").await;

        svc.delete_device(id).await.unwrap();

        let result = svc.get_device(id).await;
        assert!(matches!(result, Err(DeviceHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_refuse_delete_when_in_use() {
        let svc = make_service();
        let id = create(&svc, "A", "B").await;
        svc.update_device(
            id,
            DeviceChanges {
                state: Some(DeviceState::InUse),
                ..DeviceChanges::default()
            },
        )
        .await
        .unwrap();

        let result = svc.delete_device(id).await;

        assert!(matches!(
            result,
            Err(DeviceHubError::Conflict(ConflictError::InUse { .. }))
        ));
        assert!(svc.get_device(id).await.is_ok());
    }

    #[tokio::test]
    async fn should_return_not_found_when_deleting_unknown_device() {
        let svc = make_service();
        let result = svc.delete_device(DeviceId::new(1)).await;
        assert!(matches!(result, Err(DeviceHubError::NotFound(_))));
    }
}
