//! Error types for registry operations.

use thiserror::Error;

use shardgate_store::StoreError;

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors surfaced by registry operations.
///
/// Validation and duplicate errors are synchronous and leave no partial
/// state. Store errors abort the current operation; probe failures are
/// never errors — they degrade to `online = false`.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid endpoint name: {0}")]
    InvalidName(String),

    #[error("invalid port: {0}")]
    InvalidPort(u16),

    #[error("endpoint already exists: {0}")]
    Duplicate(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("routing table error: {0}")]
    Routing(String),
}
