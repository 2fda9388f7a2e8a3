//! `SQLite` implementation of [`DeviceRepository`].

use std::future::Future;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use devicehub_app::ports::{DeviceFilter, DeviceRepository};
use devicehub_domain::device::{Device, DeviceState};
use devicehub_domain::error::{DeviceHubError, NotFoundError};
use devicehub_domain::id::DeviceId;
use devicehub_domain::page::{Page, PageRequest};

use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Device`].
struct Wrapper(Device);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Device> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let name: Option<String> = row.try_get("name")?;
        let brand: Option<String> = row.try_get("brand")?;
        let state: String = row.try_get("state")?;
        let created_at: String = row.try_get("created_at")?;

        let state =
            DeviceState::from_str(&state).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(Device::rehydrate(
            DeviceId::new(id),
            name,
            brand,
            state,
            created_at,
        )))
    }
}

const INSERT: &str = "INSERT INTO devices (name, brand, state, created_at) VALUES (?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM devices WHERE id = ?";
const SELECT_PAGE: &str = r"
    SELECT * FROM devices
    WHERE (? IS NULL OR brand = ?) AND (? IS NULL OR state = ?)
    ORDER BY id
    LIMIT ? OFFSET ?
";
const COUNT: &str = r"
    SELECT COUNT(*) FROM devices
    WHERE (? IS NULL OR brand = ?) AND (? IS NULL OR state = ?)
";
const UPDATE: &str = "UPDATE devices SET name = ?, brand = ?, state = ? WHERE id = ?";
const DELETE_BY_ID: &str = "DELETE FROM devices WHERE id = ?";

/// `SQLite`-backed device repository.
pub struct SqliteDeviceRepository {
    pool: SqlitePool,
}

impl SqliteDeviceRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DeviceRepository for SqliteDeviceRepository {
    fn save(
        &self,
        mut device: Device,
    ) -> impl Future<Output = Result<Device, DeviceHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            if let Some(id) = device.id() {
                let result = sqlx::query(UPDATE)
                    .bind(device.name())
                    .bind(device.brand())
                    .bind(device.state().as_str())
                    .bind(id.get())
                    .execute(&pool)
                    .await
                    .map_err(StorageError::from)?;

                if result.rows_affected() == 0 {
                    return Err(NotFoundError {
                        entity: "Device",
                        id: id.to_string(),
                    }
                    .into());
                }
            } else {
                let result = sqlx::query(INSERT)
                    .bind(device.name())
                    .bind(device.brand())
                    .bind(device.state().as_str())
                    .bind(device.created_at().to_rfc3339())
                    .execute(&pool)
                    .await
                    .map_err(StorageError::from)?;

                device.assign_id(DeviceId::new(result.last_insert_rowid()));
                tracing::debug!(device_id = ?device.id(), "device row inserted");
            }

            Ok(device)
        }
    }

    fn find_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<Device>, DeviceHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.get())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn find_all(
        &self,
        filter: DeviceFilter,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<Device>, DeviceHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let state = filter.state.map(DeviceState::as_str);
            let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_PAGE)
                .bind(filter.brand.as_deref())
                .bind(filter.brand.as_deref())
                .bind(state)
                .bind(state)
                .bind(i64::from(page.size()))
                .bind(offset)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            let total: i64 = sqlx::query_scalar(COUNT)
                .bind(filter.brand.as_deref())
                .bind(filter.brand.as_deref())
                .bind(state)
                .bind(state)
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            let items = rows.into_iter().map(|w| w.0).collect();
            Ok(Page::new(
                items,
                page,
                u64::try_from(total).unwrap_or_default(),
            ))
        }
    }

    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<(), DeviceHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.get())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
