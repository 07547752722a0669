//! Field extraction error types
//!
//! A failed field lookup never aborts a record: the extractor logs the error
//! at trace level and substitutes the field's default.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Field '{field}' not found")]
    FieldMissing { field: &'static str },

    #[error("Field '{field}' has an unparsable value '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl ExtractionError {
    pub const fn missing(field: &'static str) -> Self {
        Self::FieldMissing { field }
    }

    pub fn invalid_number(field: &'static str, value: &str) -> Self {
        Self::InvalidNumber {
            field,
            value: value.to_string(),
        }
    }

    pub fn invalid_selector(selector: &str, reason: &str) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Substitute the field default, tracing why the lookup failed
pub fn or_default<T: Default>(field: &'static str, result: ExtractionResult<T>) -> T {
    result.unwrap_or_else(|e| {
        tracing::trace!("Using default for '{}': {}", field, e);
        T::default()
    })
}
