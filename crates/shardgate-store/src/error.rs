//! Error types for the shardgate durable store.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to database: {0}")]
    Connect(String),

    #[error("schema migration failed: {0}")]
    Migrate(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    #[error("query failed: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = e
            && db.is_unique_violation()
        {
            return StoreError::Duplicate(db.to_string());
        }
        StoreError::Query(e.to_string())
    }
}
