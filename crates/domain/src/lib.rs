//! # devicehub-domain
//!
//! Pure domain model for the devicehub resource manager.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **Device** aggregate (name, brand, lifecycle state, creation time)
//! - Define the **`DeviceState`** lifecycle (`AVAILABLE`, `IN_USE`, `INACTIVE`)
//! - Define paging value objects shared by the repository port and callers
//! - Contain all invariant enforcement (a device in use cannot be renamed,
//!   rebranded, or deleted)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod page;
