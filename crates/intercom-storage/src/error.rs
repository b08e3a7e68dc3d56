use thiserror::Error;

/// Storage-specific error types for the intercom access system.
///
/// Deny outcomes are never errors; these represent failures to read or
/// write the resident, visitor and access log tables.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Entity not found in database
    #[error("Entity not found: {entity_type} with {field}={value}")]
    NotFound {
        entity_type: String,
        field: String,
        value: String,
    },

    /// Stored data or caller input failed a domain rule
    #[error("Domain error: {0}")]
    Domain(#[from] intercom_core::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Another writer changed the row between our read and our update
    #[error("Concurrent update: {0}")]
    Conflict(String),

    /// Validation failed after retries
    #[error("Validation failed after {0} retries: {1}")]
    ValidationFailed(usize, String),
}

impl StorageError {
    pub(crate) fn not_found(entity_type: &str, field: &str, value: impl ToString) -> Self {
        StorageError::NotFound {
            entity_type: entity_type.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Whether SQLite refused the operation because another connection
    /// holds the write lock or committed after our snapshot.
    pub fn is_busy(&self) -> bool {
        match self {
            StorageError::Database(sqlx::Error::Database(db)) => db
                .code()
                .is_some_and(|code| matches!(code.as_ref(), "5" | "6" | "261" | "517")),
            _ => false,
        }
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
