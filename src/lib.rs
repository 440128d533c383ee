//! campus_store library: cached access to campus building records
//!
//! This library provides a caching layer over a SQLite store of campus
//! buildings: an identifier cache and a record cache with per-record
//! hydration, layered over a connection handle that is opened read-only or
//! read-write on demand and closed as soon as each operation finishes.
//!
//! # Example
//!
//! ```no_run
//! use campus_store::{BuildingCache, NewBuilding, SqliteStore};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::create(std::path::Path::new("campus.db")).await?;
//! let mut cache = BuildingCache::new(store);
//!
//! let id = cache
//!     .create(&NewBuilding {
//!         name: "Featheringill Hall".into(),
//!         lat_e6: 36_144_700,
//!         lon_e6: -86_803_200,
//!         description: "Engineering building".into(),
//!         image_url: None,
//!     })
//!     .await?;
//!
//! println!("{} is at {}, {}", cache.get_name(id).await?,
//!          cache.get_lat(id).await?, cache.get_lon(id).await?);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

#![warn(missing_docs)]

mod cache;
pub mod config;
mod error_handling;
pub mod initialization;
mod models;
mod storage;

// Re-export public API
pub use cache::{BuildingCache, ConnectionMode};
pub use error_handling::{CacheError, StorageError};
pub use models::{Building, NewBuilding};
pub use storage::{BuildingStore, CoreRow, DetailRow, SqliteStore};
