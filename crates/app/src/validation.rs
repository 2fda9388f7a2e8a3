//! Pre-creation checks on device attributes.
//!
//! Validators are registered as an ordered list and run one after the other;
//! the first failure aborts creation. New rules are added by registering
//! another [`DeviceAttributesValidator`], not by touching the use-case.

use devicehub_domain::error::{DeviceHubError, ValidationError};

/// A single check run against the attributes of a device about to be created.
pub trait DeviceAttributesValidator: Send + Sync {
    /// Check `name` and `brand`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceHubError::Validation`] when the attributes are rejected.
    fn validate(&self, name: Option<&str>, brand: Option<&str>) -> Result<(), DeviceHubError>;
}

/// Requires both `name` and `brand` to be present and non-blank.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameBrandValidator;

impl DeviceAttributesValidator for NameBrandValidator {
    fn validate(&self, name: Option<&str>, brand: Option<&str>) -> Result<(), DeviceHubError> {
        let missing = |value: Option<&str>| value.is_none_or(|v| v.trim().is_empty());
        if missing(name) || missing(brand) {
            return Err(ValidationError::MissingNameOrBrand.into());
        }
        Ok(())
    }
}

/// Run `validators` in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the error of the first validator that rejects the attributes.
pub fn run_all(
    validators: &[Box<dyn DeviceAttributesValidator>],
    name: Option<&str>,
    brand: Option<&str>,
) -> Result<(), DeviceHubError> {
    validators
        .iter()
        .try_for_each(|validator| validator.validate(name, brand))
}
