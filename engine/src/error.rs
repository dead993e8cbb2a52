//! Error types for the Stash engine.

use thiserror::Error;

/// All possible errors from the Stash engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Envelope errors
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("request failed: {0}")]
    Application(String),

    #[error("missing payload: {0}")]
    MissingPayload(String),

    #[error("invalid payload for '{key}': expected {expected}, got {got} ({reason})")]
    InvalidPayload {
        key: String,
        expected: String,
        got: String,
        reason: String,
    },

    // Input errors
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // State errors
    #[error("entity not found: {0}")]
    EntityNotFound(String),
}

impl Error {
    /// Create a validation error for a field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Classify the error for status reporting.
    pub fn kind(&self) -> crate::ErrorKind {
        match self {
            Error::Application(_) => crate::ErrorKind::Application,
            Error::Validation { .. } => crate::ErrorKind::Validation,
            Error::MalformedEnvelope(_)
            | Error::MissingPayload(_)
            | Error::InvalidPayload { .. }
            | Error::EntityNotFound(_) => crate::ErrorKind::Decode,
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
