//! Error types for input validation.

use thiserror::Error;

/// Malformed update or query input.
///
/// Never fatal: the offending event is dropped and processing continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid input: {message}")]
pub struct ValidationError {
    /// Human-readable message.
    pub message: String,
    /// Field that failed validation (if applicable).
    pub field: Option<String>,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    /// Create with field.
    pub fn with_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Get error code for responses and logs.
    pub fn error_code(&self) -> &'static str {
        "INVALID_INPUT"
    }
}

/// Result type alias for validation.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
