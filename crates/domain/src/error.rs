//! Common error types used across the workspace.
//!
//! Each variant of [`DeviceHubError`] is one *kind* of failure. Callers at the
//! edge (HTTP, CLI) decide how a kind is presented; the core only guarantees
//! that the right kind is raised with a descriptive message.

/// Top-level error returned by domain operations, use-cases and ports.
#[derive(Debug, thiserror::Error)]
pub enum DeviceHubError {
    /// A supplied parameter is missing or malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested resource does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The operation is not allowed in the resource's current state.
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// The persistence layer failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Invalid input supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name and brand must not be empty")]
    MissingNameOrBrand,

    #[error("unknown device state `{0}`")]
    UnknownState(String),

    #[error("invalid device id `{0}`")]
    InvalidId(String),

    #[error("page size must be greater than zero")]
    InvalidPageSize,

    /// The request could not be decoded (bad query types, unreadable body).
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

/// A lookup by identifier came back empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} with id {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A business rule forbids the operation in the current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    /// The device is `IN_USE`; `action` names what was refused.
    #[error("cannot {action}: device is currently in use")]
    InUse { action: &'static str },

    #[error("state cannot be null")]
    MissingState,
}
