// storage/mod.rs
// Storage collaborator: the narrow interface the cache core consumes.

pub mod migrations;
pub mod sqlite;

#[cfg(test)]
pub(crate) mod mock;

// Re-export commonly used items
pub use migrations::run_migrations;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::error_handling::StorageError;
use crate::models::{Building, NewBuilding};

/// Core-field projection of a building row (name and coordinates).
///
/// Rows are returned in store order, parallel to [`BuildingStore::fetch_all_ids`].
#[derive(Debug, Clone)]
pub struct CoreRow {
    /// Store-assigned row identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Latitude in microdegrees.
    pub lat_e6: i32,
    /// Longitude in microdegrees.
    pub lon_e6: i32,
}

/// Detail-field projection of a building row (the expensive-to-fetch
/// fields, loaded on demand during hydration).
#[derive(Debug, Clone)]
pub struct DetailRow {
    /// Free-text description.
    pub description: String,
    /// Optional image reference URL.
    pub image_url: Option<String>,
}

/// Persistent store of building records.
///
/// A store owns at most one live handle; the cache core drives the handle
/// through `open_readable`/`open_writable`/`close` and calls the data
/// methods only while the handle is open in a suitable mode. Calling a
/// data method while closed is a [`StorageError::NotOpen`] programming
/// error, not a recoverable condition.
#[async_trait]
pub trait BuildingStore {
    /// Opens the handle read-only.
    async fn open_readable(&mut self) -> Result<(), StorageError>;

    /// Opens the handle read-write.
    async fn open_writable(&mut self) -> Result<(), StorageError>;

    /// Closes the handle; no-op when already closed.
    async fn close(&mut self) -> Result<(), StorageError>;

    /// All row identifiers, in store order.
    async fn fetch_all_ids(&mut self) -> Result<Vec<i64>, StorageError>;

    /// Core fields of every row, in the same store order as
    /// [`fetch_all_ids`](BuildingStore::fetch_all_ids).
    async fn fetch_core_rows(&mut self) -> Result<Vec<CoreRow>, StorageError>;

    /// Detail fields for one row, or `None` when no such row exists.
    async fn fetch_detail(&mut self, id: i64) -> Result<Option<DetailRow>, StorageError>;

    /// Full records sorted by display name, for bulk listing.
    async fn fetch_all_sorted(&mut self) -> Result<Vec<Building>, StorageError>;

    /// Inserts a record and returns its store-assigned identifier.
    async fn insert(&mut self, building: &NewBuilding) -> Result<i64, StorageError>;

    /// Overwrites the record at `id`; `false` when no such row exists.
    async fn update(&mut self, id: i64, building: &NewBuilding) -> Result<bool, StorageError>;

    /// Deletes the record at `id`; `false` when no such row exists.
    async fn delete(&mut self, id: i64) -> Result<bool, StorageError>;
}
