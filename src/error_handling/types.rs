//! Error type definitions.

use thiserror::Error;

/// Error types for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// A data operation was attempted while the handle is closed.
    ///
    /// This indicates a programming error -- the connection-mode
    /// controller must open the handle before any read or write.
    #[error("Store handle is not open")]
    NotOpen,
}

/// Error types for cache operations.
///
/// Distinguishes ordinary storage I/O failures (recoverable, caches left
/// untouched) from cache/store divergence (fatal, indicates corruption).
#[derive(Error, Debug)]
pub enum CacheError {
    /// The underlying store failed; no cache state was mutated.
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),

    /// An identifier held by the cache has no matching store row, or a
    /// caller-supplied identifier has no cache position. The cache and
    /// store have diverged and the cached snapshot cannot be trusted.
    #[error("Cache/store discrepancy for building {id}")]
    Discrepancy {
        /// The identifier that could not be resolved.
        id: i64,
    },
}
