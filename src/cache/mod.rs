//! Building cache: the caching layer in front of the persistent store.
//!
//! This module provides:
//! - A connection-mode controller that keeps the store handle open for the
//!   minimum duration, switching between read-only and read-write lazily
//! - A two-tier cache (identifier list + record list with per-record
//!   hydration state) avoiding redundant store round-trips
//! - A write-through mutation pipeline that keeps the cache consistent
//!   with the store or invalidates it
//!
//! Every public operation leaves the handle closed when it returns; bursty
//! inserts go through [`BuildingCache::create_all`], which opens the
//! handle read-write once for the whole batch.
//!
//! All methods take `&mut self`, so exclusive access is enforced by the
//! borrow checker. Callers sharing one cache across tasks wrap it in
//! `tokio::sync::Mutex`.


use log::{debug, info};

use crate::config::MICRODEGREES_PER_DEGREE;
use crate::error_handling::CacheError;
use crate::models::{Building, NewBuilding};
use crate::storage::{BuildingStore, DetailRow};

/// State of the underlying store handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// No live handle.
    Closed,
    /// Handle open read-only.
    Readable,
    /// Handle open read-write.
    Writable,
}

/// One record-cache entry. Core fields are always present once the tier
/// is populated; `detail` is `Some` only after hydration.
#[derive(Debug, Clone)]
struct CachedBuilding {
    name: String,
    lat_e6: i32,
    lon_e6: i32,
    detail: Option<DetailRow>,
}

impl CachedBuilding {
    fn to_building(&self, id: i64) -> Building {
        let detail = self.detail.clone().unwrap_or_else(|| DetailRow {
            description: String::new(),
            image_url: None,
        });
        Building {
            id,
            name: self.name.clone(),
            lat_e6: self.lat_e6,
            lon_e6: self.lon_e6,
            description: detail.description,
            image_url: detail.image_url,
        }
    }
}

/// Caching layer over a [`BuildingStore`].
///
/// Holds two lazily populated tiers: the identifier list (a complete,
/// store-consistent snapshot of the id column) and the record list,
/// positionally parallel to it. Both start unpopulated and are filled on
/// first access; mutations either keep them consistent with the store or
/// invalidate them so the next access repopulates from scratch.
pub struct BuildingCache<S> {
    store: S,
    mode: ConnectionMode,
    ids: Option<Vec<i64>>,
    records: Option<Vec<CachedBuilding>>,
}

impl<S: BuildingStore> BuildingCache<S> {
    /// Creates a cache over `store` with both tiers unpopulated and the
    /// handle closed.
    pub fn new(store: S) -> Self {
        BuildingCache {
            store,
            mode: ConnectionMode::Closed,
            ids: None,
            records: None,
        }
    }

    /// Current state of the store handle.
    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    // ---- connection-mode controller ----

    async fn ensure_readable(&mut self) -> Result<(), CacheError> {
        match self.mode {
            ConnectionMode::Readable => Ok(()),
            ConnectionMode::Writable => {
                self.mode = ConnectionMode::Closed;
                self.store.close().await?;
                debug!("Reopening store handle read-only");
                self.store.open_readable().await?;
                self.mode = ConnectionMode::Readable;
                Ok(())
            }
            ConnectionMode::Closed => {
                debug!("Opening store handle read-only");
                self.store.open_readable().await?;
                self.mode = ConnectionMode::Readable;
                Ok(())
            }
        }
    }

    async fn ensure_writable(&mut self) -> Result<(), CacheError> {
        match self.mode {
            ConnectionMode::Writable => Ok(()),
            ConnectionMode::Readable => {
                self.mode = ConnectionMode::Closed;
                self.store.close().await?;
                debug!("Reopening store handle read-write");
                self.store.open_writable().await?;
                self.mode = ConnectionMode::Writable;
                Ok(())
            }
            ConnectionMode::Closed => {
                debug!("Opening store handle read-write");
                self.store.open_writable().await?;
                self.mode = ConnectionMode::Writable;
                Ok(())
            }
        }
    }

    /// Closes the store handle. Idempotent; callable at any time as a
    /// resource-release hint.
    pub async fn close(&mut self) -> Result<(), CacheError> {
        if self.mode == ConnectionMode::Closed {
            return Ok(());
        }
        // Mark closed before awaiting so a failed close is not retried
        // against a broken handle.
        self.mode = ConnectionMode::Closed;
        self.store.close().await?;
        Ok(())
    }

    /// Closes the handle and returns `result`, preferring the operation's
    /// own error over a close failure.
    async fn finish<T>(&mut self, result: Result<T, CacheError>) -> Result<T, CacheError> {
        match self.close().await {
            Ok(()) => result,
            Err(close_err) => result.and(Err(close_err)),
        }
    }

    // ---- cache population ----

    async fn populate_ids(&mut self) -> Result<(), CacheError> {
        if self.ids.is_some() {
            return Ok(());
        }
        self.ensure_readable().await?;
        let ids = self.store.fetch_all_ids().await?;
        info!("Cached {} building ids", ids.len());
        self.ids = Some(ids);
        Ok(())
    }

    async fn populate_records(&mut self) -> Result<(), CacheError> {
        if self.records.is_some() {
            return Ok(());
        }
        self.populate_ids().await?;
        self.ensure_readable().await?;
        let rows = self.store.fetch_core_rows().await?;
        info!("Cached core fields for {} buildings", rows.len());
        // Rebuild the identifier tier from the same read so the two tiers
        // are positionally parallel even if the store changed since the
        // identifiers were first cached.
        self.ids = Some(rows.iter().map(|r| r.id).collect());
        self.records = Some(
            rows.into_iter()
                .map(|r| CachedBuilding {
                    name: r.name,
                    lat_e6: r.lat_e6,
                    lon_e6: r.lon_e6,
                    detail: None,
                })
                .collect(),
        );
        Ok(())
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.ids.as_ref()?.iter().position(|&cached| cached == id)
    }

    /// Drops both tiers, forcing full repopulation on next access.
    fn invalidate(&mut self) {
        self.ids = None;
        self.records = None;
    }

    // ---- accessors ----

    /// All known building identifiers, in store order.
    ///
    /// Returns a snapshot the caller may freely mutate without affecting
    /// the cache.
    pub async fn get_identifiers(&mut self) -> Result<Vec<i64>, CacheError> {
        let result = self.populate_ids().await;
        let result = self.finish(result).await;
        result.map(|()| self.ids.clone().unwrap_or_default())
    }

    /// The fully hydrated record for `id`.
    ///
    /// Fetches the description and image URL from the store on first
    /// access and caches them in place; subsequent calls are served
    /// entirely from the cache.
    pub async fn get_record(&mut self, id: i64) -> Result<Building, CacheError> {
        let result = self.get_record_inner(id).await;
        self.finish(result).await
    }

    async fn get_record_inner(&mut self, id: i64) -> Result<Building, CacheError> {
        self.populate_records().await?;
        let i = self.position(id).ok_or(CacheError::Discrepancy { id })?;
        let hydrated = self
            .records
            .as_ref()
            .is_some_and(|records| records[i].detail.is_some());
        if !hydrated {
            self.ensure_readable().await?;
            debug!("Hydrating building {id}");
            let detail = self
                .store
                .fetch_detail(id)
                .await?
                .ok_or(CacheError::Discrepancy { id })?;
            if let Some(records) = self.records.as_mut() {
                records[i].detail = Some(detail);
            }
        }
        let records = self.records.as_ref().ok_or(CacheError::Discrepancy { id })?;
        Ok(records[i].to_building(id))
    }

    /// Display name for `id`. Never triggers hydration.
    pub async fn get_name(&mut self, id: i64) -> Result<String, CacheError> {
        let result = self.with_entry(id, |entry| entry.name.clone()).await;
        self.finish(result).await
    }

    /// Latitude in degrees for `id`. Never triggers hydration.
    pub async fn get_lat(&mut self, id: i64) -> Result<f64, CacheError> {
        let result = self
            .with_entry(id, |entry| f64::from(entry.lat_e6) / MICRODEGREES_PER_DEGREE)
            .await;
        self.finish(result).await
    }

    /// Longitude in degrees for `id`. Never triggers hydration.
    pub async fn get_lon(&mut self, id: i64) -> Result<f64, CacheError> {
        let result = self
            .with_entry(id, |entry| f64::from(entry.lon_e6) / MICRODEGREES_PER_DEGREE)
            .await;
        self.finish(result).await
    }

    /// Cached description for `id`, or `None` when the entry has not been
    /// hydrated yet. Callers needing a guaranteed-fresh value use
    /// [`get_record`](BuildingCache::get_record).
    pub async fn get_description(&mut self, id: i64) -> Result<Option<String>, CacheError> {
        let result = self
            .with_entry(id, |entry| {
                entry.detail.as_ref().map(|d| d.description.clone())
            })
            .await;
        self.finish(result).await
    }

    /// Cached image URL for `id`, or `None` when the entry has not been
    /// hydrated yet (or carries no URL). Callers needing a
    /// guaranteed-fresh value use [`get_record`](BuildingCache::get_record).
    pub async fn get_image_url(&mut self, id: i64) -> Result<Option<String>, CacheError> {
        let result = self
            .with_entry(id, |entry| {
                entry.detail.as_ref().and_then(|d| d.image_url.clone())
            })
            .await;
        self.finish(result).await
    }

    async fn with_entry<T>(
        &mut self,
        id: i64,
        read: impl FnOnce(&CachedBuilding) -> T,
    ) -> Result<T, CacheError> {
        self.populate_records().await?;
        let i = self.position(id).ok_or(CacheError::Discrepancy { id })?;
        let records = self.records.as_ref().ok_or(CacheError::Discrepancy { id })?;
        Ok(read(&records[i]))
    }

    /// All records, fully populated and sorted by display name, straight
    /// from the store. Bypasses the cache tiers; intended for bulk list
    /// binding.
    pub async fn all_sorted(&mut self) -> Result<Vec<Building>, CacheError> {
        let result = self.all_sorted_inner().await;
        self.finish(result).await
    }

    async fn all_sorted_inner(&mut self) -> Result<Vec<Building>, CacheError> {
        self.ensure_readable().await?;
        Ok(self.store.fetch_all_sorted().await?)
    }

    // ---- mutation pipeline ----

    /// Writes a new building to the store and returns its assigned
    /// identifier.
    pub async fn create(&mut self, building: &NewBuilding) -> Result<i64, CacheError> {
        let result = self.create_inner(building).await;
        self.finish(result).await
    }

    async fn create_inner(&mut self, building: &NewBuilding) -> Result<i64, CacheError> {
        self.ensure_writable().await?;
        let id = self.store.insert(building).await?;
        self.absorb_created(id, building);
        Ok(id)
    }

    /// Writes a batch of new buildings, opening the store handle
    /// read-write once for the whole batch and closing it at the end.
    ///
    /// Stops at the first store failure; records inserted before the
    /// failure remain in the store. Intended for bulk seed imports.
    pub async fn create_all(&mut self, buildings: &[NewBuilding]) -> Result<Vec<i64>, CacheError> {
        let result = self.create_all_inner(buildings).await;
        self.finish(result).await
    }

    async fn create_all_inner(
        &mut self,
        buildings: &[NewBuilding],
    ) -> Result<Vec<i64>, CacheError> {
        self.ensure_writable().await?;
        let mut ids = Vec::with_capacity(buildings.len());
        for building in buildings {
            let id = self.store.insert(building).await?;
            self.absorb_created(id, building);
            ids.push(id);
        }
        info!("Created {} buildings in one batch", ids.len());
        Ok(ids)
    }

    /// Folds a freshly created record into the cache tiers.
    ///
    /// With a populated record cache the new entry is appended to both
    /// tiers, hydrated (every field was supplied by the caller). With only
    /// the identifier tier populated, appending there alone would leave a
    /// snapshot marked complete but missing the record, so both tiers are
    /// invalidated instead. Unpopulated tiers stay unpopulated.
    fn absorb_created(&mut self, id: i64, building: &NewBuilding) {
        if self.records.is_some() {
            if let (Some(ids), Some(records)) = (self.ids.as_mut(), self.records.as_mut()) {
                ids.push(id);
                records.push(CachedBuilding {
                    name: building.name.clone(),
                    lat_e6: building.lat_e6,
                    lon_e6: building.lon_e6,
                    detail: Some(DetailRow {
                        description: building.description.clone(),
                        image_url: building.image_url.clone(),
                    }),
                });
            }
        } else if self.ids.is_some() {
            self.invalidate();
        }
    }

    /// Overwrites the record at `id` in the store and cache.
    ///
    /// Returns `Ok(false)` without touching the store when `id` is
    /// unknown.
    pub async fn update(&mut self, id: i64, building: &NewBuilding) -> Result<bool, CacheError> {
        let result = self.update_inner(id, building).await;
        self.finish(result).await
    }

    async fn update_inner(&mut self, id: i64, building: &NewBuilding) -> Result<bool, CacheError> {
        self.populate_ids().await?;
        let Some(i) = self.position(id) else {
            return Ok(false);
        };
        self.ensure_writable().await?;
        let success = self.store.update(id, building).await?;
        if success {
            if let Some(records) = self.records.as_mut() {
                records[i] = CachedBuilding {
                    name: building.name.clone(),
                    lat_e6: building.lat_e6,
                    lon_e6: building.lon_e6,
                    detail: Some(DetailRow {
                        description: building.description.clone(),
                        image_url: building.image_url.clone(),
                    }),
                };
            }
        }
        Ok(success)
    }

    /// Deletes the record at `id` from the store and cache.
    ///
    /// Returns `Ok(false)` when the store holds no such row; caches are
    /// left untouched in that case.
    pub async fn delete(&mut self, id: i64) -> Result<bool, CacheError> {
        let result = self.delete_inner(id).await;
        self.finish(result).await
    }

    async fn delete_inner(&mut self, id: i64) -> Result<bool, CacheError> {
        self.ensure_writable().await?;
        if !self.store.delete(id).await? {
            return Ok(false);
        }
        if let Some(i) = self.position(id) {
            if let Some(ids) = self.ids.as_mut() {
                ids.remove(i);
            }
            if let Some(records) = self.records.as_mut() {
                records.remove(i);
            }
        }
        Ok(true)
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
