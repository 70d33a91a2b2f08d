//! # DomainError
//!
//! Centralized error handling for NotY.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Resource not found (e.g., Page, Block, User)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., missing field, unknown layer type)
    #[error("{0}")]
    ValidationError(String),

    /// Auth failure (e.g., bad credentials, invalid or expired token)
    #[error("{0}")]
    Unauthorized(String),

    /// Resource already exists (e.g., duplicate email)
    #[error("{0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., database error, hashing failure)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound(entity.to_string(), id.to_string())
    }
}

/// A specialized Result type for NotY domain logic.
pub type DomainResult<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = DomainError::not_found("Page", "abc");
        assert_eq!(err.to_string(), "Page not found with ID abc");
    }

    #[test]
    fn internal_message_is_prefixed() {
        let err = DomainError::Internal("disk I/O error".into());
        assert!(err.to_string().starts_with("internal service error"));
    }
}
