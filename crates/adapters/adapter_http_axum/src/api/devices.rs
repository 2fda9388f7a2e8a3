//! JSON REST handlers for devices.

use std::str::FromStr;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use devicehub_app::ports::{DeviceFilter, DeviceRepository};
use devicehub_app::services::device_service::DeviceChanges;
use devicehub_domain::device::{Device, DeviceState};
use devicehub_domain::error::{DeviceHubError, ValidationError};
use devicehub_domain::id::DeviceId;
use devicehub_domain::page::{Page, PageRequest};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 10;

/// Request body for creating a device.
#[derive(Deserialize)]
pub struct CreateDeviceRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
}

/// Request body shared by full (`PUT`) and partial (`PATCH`) updates.
#[derive(Deserialize)]
pub struct UpdateDeviceRequest {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub state: Option<String>,
}

impl UpdateDeviceRequest {
    fn into_changes(self) -> Result<DeviceChanges, ApiError> {
        Ok(DeviceChanges {
            state: parse_state(self.state.as_deref())?,
            name: self.name,
            brand: self.brand,
        })
    }
}

/// Query string accepted by the list endpoint.
#[derive(Deserialize)]
pub struct ListQuery {
    pub brand: Option<String>,
    pub state: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl ListQuery {
    fn into_parts(self) -> Result<(DeviceFilter, PageRequest), ApiError> {
        let filter = DeviceFilter {
            brand: self.brand.filter(|b| !b.trim().is_empty()),
            state: parse_state(self.state.as_deref())?,
        };
        let page = PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )?;
        Ok((filter, page))
    }
}

/// Blank or missing text means "no state"; anything else must name one.
fn parse_state(value: Option<&str>) -> Result<Option<DeviceState>, ApiError> {
    match value {
        Some(text) if !text.trim().is_empty() => DeviceState::from_str(text)
            .map(Some)
            .map_err(|err| ApiError::from(DeviceHubError::from(err))),
        _ => Ok(None),
    }
}

fn parse_id(id: &str) -> Result<DeviceId, ApiError> {
    DeviceId::from_str(id).map_err(|_| {
        ApiError::from(DeviceHubError::Validation(ValidationError::InvalidId(
            id.to_string(),
        )))
    })
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Page<Device>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get, update and patch endpoints.
pub enum GetResponse {
    Ok(Json<Device>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Device>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/devices?brand=&state=&page=&size=`
pub async fn list<DR>(
    State(state): State<AppState<DR>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<ListResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
{
    let Query(query) = query?;
    let (filter, page) = query.into_parts()?;
    let devices = state.device_service.list_devices(filter, page).await?;
    Ok(ListResponse::Ok(Json(devices)))
}

/// `GET /api/devices/:id`
pub async fn get<DR>(
    State(state): State<AppState<DR>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
{
    let device_id = parse_id(&id)?;
    let device = state.device_service.get_device(device_id).await?;
    Ok(GetResponse::Ok(Json(device)))
}

/// `POST /api/devices`
pub async fn create<DR>(
    State(state): State<AppState<DR>>,
    req: Result<Json<CreateDeviceRequest>, JsonRejection>,
) -> Result<CreateResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
{
    let Json(req) = req?;
    let created = state
        .device_service
        .create_device(req.name, req.brand)
        .await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/devices/:id`
pub async fn update<DR>(
    State(state): State<AppState<DR>>,
    Path(id): Path<String>,
    req: Result<Json<UpdateDeviceRequest>, JsonRejection>,
) -> Result<GetResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
{
    let device_id = parse_id(&id)?;
    let Json(req) = req?;
    let changes = req.into_changes()?;
    let device = state
        .device_service
        .update_device(device_id, changes)
        .await?;
    Ok(GetResponse::Ok(Json(device)))
}

/// `PATCH /api/devices/:id`
pub async fn patch<DR>(
    State(state): State<AppState<DR>>,
    Path(id): Path<String>,
    req: Result<Json<UpdateDeviceRequest>, JsonRejection>,
) -> Result<GetResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
{
    let device_id = parse_id(&id)?;
    let Json(req) = req?;
    let changes = req.into_changes()?;
    let device = state.device_service.patch_device(device_id, changes).await?;
    Ok(GetResponse::Ok(Json(device)))
}

/// `DELETE /api/devices/:id`
pub async fn delete<DR>(
    State(state): State<AppState<DR>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    DR: DeviceRepository + Send + Sync + 'static,
{
    let device_id = parse_id(&id)?;
    state.device_service.delete_device(device_id).await?;
    Ok(DeleteResponse::NoContent)
}
