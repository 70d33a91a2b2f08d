//! Storage error handling
//!
//! Typed errors for persistence operations and their mapping onto the
//! domain taxonomy.

use domains::DomainError;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// A unique index rejected the write (e.g., duplicate email)
    #[error("duplicate record: {0}")]
    Duplicate(String),

    /// A row referenced by the operation no longer exists
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: String },

    /// A stored value could not be decoded
    #[error("corrupt record in '{table}': {details}")]
    CorruptRecord { table: &'static str, details: String },

    /// JSON child list could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Unique indexes whose violation is a duplicate the client caused. Any
/// other unique or primary-key failure is an internal fault.
const CLIENT_UNIQUE_CONSTRAINTS: &[&str] = &["users.email"];

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let message = db.message();
            if db.is_unique_violation() && CLIENT_UNIQUE_CONSTRAINTS.iter().any(|c| message.contains(c)) {
                return StorageError::Duplicate(db.message().to_string());
            }
        }
        StorageError::Database(err)
    }
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Duplicate(details) => DomainError::Conflict(details),
            StorageError::NotFound { entity, id } => DomainError::NotFound(entity.to_string(), id),
            other => DomainError::Internal(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
