//! Domain error model.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Domain-level error.
///
/// Deterministic business failures only. Storage and decode failures are
/// modelled by the crates that own those concerns.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more fields failed validation.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_convert() {
        let mut errors = ValidationErrors::new();
        errors.push("name", "is required");
        let err: DomainError = errors.clone().into();
        assert_eq!(err, DomainError::Validation(errors));
        assert!(err.to_string().starts_with("validation failed"));
    }
}
