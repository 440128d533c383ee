//! Error handling.
//!
//! Error types are categorized into:
//! - **Storage failures**: open/read/write/close errors from the backing
//!   store, propagated to the caller with no cache mutation
//! - **Cache/store discrepancy**: fatal internal-consistency errors,
//!   surfaced distinctly so callers and tests can detect corruption
//!
//! Not-found on update/delete is an ordinary `Ok(false)` result, not an
//! error.

mod types;

// Re-export public API
pub use types::{CacheError, StorageError};
