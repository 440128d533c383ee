//! Instrumented in-memory store for cache unit tests.
//!
//! Tracks per-method call counts and the open/closed state of the handle
//! so tests can assert on hydration behavior and the connection-mode
//! invariant without touching SQLite.

use async_trait::async_trait;

use crate::error_handling::StorageError;
use crate::models::{Building, NewBuilding};
use crate::storage::{BuildingStore, CoreRow, DetailRow};

/// Open state of the mock handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockHandle {
    Closed,
    ReadOnly,
    ReadWrite,
}

/// Call counters, one per trait method that touches data.
#[derive(Debug, Default, Clone)]
pub struct CallCounts {
    pub open_readable: usize,
    pub open_writable: usize,
    pub fetch_all_ids: usize,
    pub fetch_core_rows: usize,
    pub fetch_detail: usize,
    pub fetch_all_sorted: usize,
    pub insert: usize,
    pub update: usize,
    pub delete: usize,
}

pub struct MockStore {
    rows: Vec<Building>,
    next_id: i64,
    pub handle: MockHandle,
    pub calls: CallCounts,
    /// When set, the next insert/update/delete fails with an SQL error.
    pub fail_next_write: bool,
}

impl MockStore {
    pub fn new() -> Self {
        MockStore {
            rows: Vec::new(),
            next_id: 1,
            handle: MockHandle::Closed,
            calls: CallCounts::default(),
            fail_next_write: false,
        }
    }

    /// Seeds rows directly, bypassing the trait (ids assigned in order).
    pub fn with_rows(buildings: Vec<NewBuilding>) -> Self {
        let mut store = MockStore::new();
        for b in &buildings {
            let id = store.next_id;
            store.next_id += 1;
            store.rows.push(b.with_id(id));
        }
        store
    }

    pub fn ids(&self) -> Vec<i64> {
        self.rows.iter().map(|b| b.id).collect()
    }

    fn require_open(&self) -> Result<(), StorageError> {
        if self.handle == MockHandle::Closed {
            return Err(StorageError::NotOpen);
        }
        Ok(())
    }

    fn require_writable(&self) -> Result<(), StorageError> {
        if self.handle != MockHandle::ReadWrite {
            return Err(StorageError::NotOpen);
        }
        Ok(())
    }

    fn take_write_failure(&mut self) -> Result<(), StorageError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(StorageError::SqlError(sqlx::Error::RowNotFound));
        }
        Ok(())
    }
}

#[async_trait]
impl BuildingStore for MockStore {
    async fn open_readable(&mut self) -> Result<(), StorageError> {
        self.calls.open_readable += 1;
        self.handle = MockHandle::ReadOnly;
        Ok(())
    }

    async fn open_writable(&mut self) -> Result<(), StorageError> {
        self.calls.open_writable += 1;
        self.handle = MockHandle::ReadWrite;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        self.handle = MockHandle::Closed;
        Ok(())
    }

    async fn fetch_all_ids(&mut self) -> Result<Vec<i64>, StorageError> {
        self.calls.fetch_all_ids += 1;
        self.require_open()?;
        Ok(self.ids())
    }

    async fn fetch_core_rows(&mut self) -> Result<Vec<CoreRow>, StorageError> {
        self.calls.fetch_core_rows += 1;
        self.require_open()?;
        Ok(self
            .rows
            .iter()
            .map(|b| CoreRow {
                id: b.id,
                name: b.name.clone(),
                lat_e6: b.lat_e6,
                lon_e6: b.lon_e6,
            })
            .collect())
    }

    async fn fetch_detail(&mut self, id: i64) -> Result<Option<DetailRow>, StorageError> {
        self.calls.fetch_detail += 1;
        self.require_open()?;
        Ok(self.rows.iter().find(|b| b.id == id).map(|b| DetailRow {
            description: b.description.clone(),
            image_url: b.image_url.clone(),
        }))
    }

    async fn fetch_all_sorted(&mut self) -> Result<Vec<Building>, StorageError> {
        self.calls.fetch_all_sorted += 1;
        self.require_open()?;
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn insert(&mut self, building: &NewBuilding) -> Result<i64, StorageError> {
        self.calls.insert += 1;
        self.require_writable()?;
        self.take_write_failure()?;
        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(building.with_id(id));
        Ok(id)
    }

    async fn update(&mut self, id: i64, building: &NewBuilding) -> Result<bool, StorageError> {
        self.calls.update += 1;
        self.require_writable()?;
        self.take_write_failure()?;
        match self.rows.iter_mut().find(|b| b.id == id) {
            Some(row) => {
                *row = building.with_id(id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&mut self, id: i64) -> Result<bool, StorageError> {
        self.calls.delete += 1;
        self.require_writable()?;
        self.take_write_failure()?;
        let before = self.rows.len();
        self.rows.retain(|b| b.id != id);
        Ok(self.rows.len() < before)
    }
}
