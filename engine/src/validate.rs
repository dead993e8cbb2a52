//! Pre-flight input checks.
//!
//! Inputs are checked before any request is made. Full form validation
//! belongs to the form layer; these only reject inputs the backend would
//! refuse outright.

use crate::{error::Result, Error};

/// An input that can be checked before it is sent.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for () {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl Validate for serde_json::Value {
    fn validate(&self) -> Result<()> {
        if self.is_object() {
            Ok(())
        } else {
            Err(Error::validation("body", "must be a JSON object"))
        }
    }
}

/// Require a non-blank string.
pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::validation(field, "must not be empty"))
    } else {
        Ok(())
    }
}

/// Require a non-empty list.
pub fn require_non_empty<T>(field: &str, values: &[T]) -> Result<()> {
    if values.is_empty() {
        Err(Error::validation(field, "must contain at least one entry"))
    } else {
        Ok(())
    }
}

/// Require a strictly positive number.
pub fn require_positive(field: &str, value: u64) -> Result<()> {
    if value == 0 {
        Err(Error::validation(field, "must be greater than zero"))
    } else {
        Ok(())
    }
}
