//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use devicehub_domain::error::{DeviceHubError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    error: String,
}

/// Maps [`DeviceHubError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(DeviceHubError);

impl From<DeviceHubError> for ApiError {
    fn from(err: DeviceHubError) -> Self {
        Self(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        malformed(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        malformed(rejection.body_text())
    }
}

/// Requests axum could not decode are reported like any other bad parameter.
fn malformed(message: String) -> ApiError {
    tracing::debug!(error = %message, "malformed request");
    ApiError(ValidationError::MalformedRequest(message).into())
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self.0 {
            DeviceHubError::Validation(err) => {
                (StatusCode::BAD_REQUEST, "INVALID_PARAMETER", err.to_string())
            }
            DeviceHubError::NotFound(err) => {
                tracing::warn!(error = %err, "device not found");
                (StatusCode::NOT_FOUND, "DEVICE_NOT_FOUND", err.to_string())
            }
            DeviceHubError::Conflict(err) => {
                tracing::warn!(error = %err, "device state conflict");
                (StatusCode::CONFLICT, "DEVICE_STATE_CONFLICT", err.to_string())
            }
            DeviceHubError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                code,
                error: message,
            }),
        )
            .into_response()
    }
}
