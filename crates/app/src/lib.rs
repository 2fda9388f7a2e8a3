//! # devicehub-app
//!
//! Application layer: use-cases, validators and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceRepository`: save, find, page through and delete devices
//! - Define pluggable **attribute validators** run before a device is created
//! - Define **driving/inbound ports** as use-case structs:
//!   - `DeviceService`: create, get, list, update, patch, delete
//! - Orchestrate domain objects without knowing *how* persistence works
//!
//! ## Dependency rule
//! Depends on `devicehub-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
pub mod validation;
