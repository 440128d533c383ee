//! SQLite-backed building store.
//!
//! Holds a single `SqliteConnection` handle at a time, opened read-only or
//! read-write on demand by the cache core's connection-mode controller.
//! The database file and schema are created up front so read-only opens
//! never race against table creation.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{error, info};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, Row, SqliteConnection};

use crate::error_handling::StorageError;
use crate::models::{Building, NewBuilding};
use crate::storage::{run_migrations, BuildingStore, CoreRow, DetailRow};

/// Building store over a SQLite database file.
pub struct SqliteStore {
    db_path: PathBuf,
    conn: Option<SqliteConnection>,
}

impl SqliteStore {
    /// Creates the database file and schema (if missing) and returns a
    /// store with the handle closed.
    pub async fn create(db_path: &Path) -> Result<Self, StorageError> {
        match OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(db_path)
        {
            Ok(_) => info!("Database file created successfully."),
            Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
                info!("Database file already exists.")
            }
            Err(e) => {
                error!("Failed to create database file: {e}");
                return Err(StorageError::FileCreationError(e.to_string()));
            }
        }

        let mut conn = SqliteConnectOptions::new()
            .filename(db_path)
            .connect()
            .await?;
        run_migrations(&mut conn).await?;
        conn.close().await?;

        Ok(SqliteStore {
            db_path: db_path.to_path_buf(),
            conn: None,
        })
    }

    fn conn(&mut self) -> Result<&mut SqliteConnection, StorageError> {
        self.conn.as_mut().ok_or(StorageError::NotOpen)
    }

    async fn open(&mut self, read_only: bool) -> Result<(), StorageError> {
        // Drop any previous handle; mode switches go through here.
        if let Some(conn) = self.conn.take() {
            conn.close().await?;
        }
        let conn = SqliteConnectOptions::new()
            .filename(&self.db_path)
            .read_only(read_only)
            .connect()
            .await
            .map_err(|e| {
                error!("Failed to open database handle: {e}");
                StorageError::SqlError(e)
            })?;
        self.conn = Some(conn);
        Ok(())
    }
}

#[async_trait]
impl BuildingStore for SqliteStore {
    async fn open_readable(&mut self) -> Result<(), StorageError> {
        self.open(true).await
    }

    async fn open_writable(&mut self) -> Result<(), StorageError> {
        self.open(false).await
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        if let Some(conn) = self.conn.take() {
            conn.close().await?;
        }
        Ok(())
    }

    async fn fetch_all_ids(&mut self) -> Result<Vec<i64>, StorageError> {
        let ids = sqlx::query_scalar("SELECT id FROM buildings ORDER BY id")
            .fetch_all(self.conn()?)
            .await?;
        Ok(ids)
    }

    async fn fetch_core_rows(&mut self) -> Result<Vec<CoreRow>, StorageError> {
        let rows = sqlx::query("SELECT id, name, latitude, longitude FROM buildings ORDER BY id")
            .fetch_all(self.conn()?)
            .await?;
        Ok(rows
            .iter()
            .map(|row| CoreRow {
                id: row.get("id"),
                name: row.get("name"),
                lat_e6: row.get("latitude"),
                lon_e6: row.get("longitude"),
            })
            .collect())
    }

    async fn fetch_detail(&mut self, id: i64) -> Result<Option<DetailRow>, StorageError> {
        let row = sqlx::query("SELECT description, image_url FROM buildings WHERE id = ?")
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        Ok(row.map(|row| DetailRow {
            description: row.get("description"),
            image_url: row.get("image_url"),
        }))
    }

    async fn fetch_all_sorted(&mut self) -> Result<Vec<Building>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, name, latitude, longitude, description, image_url
             FROM buildings ORDER BY name",
        )
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows
            .iter()
            .map(|row| Building {
                id: row.get("id"),
                name: row.get("name"),
                lat_e6: row.get("latitude"),
                lon_e6: row.get("longitude"),
                description: row.get("description"),
                image_url: row.get("image_url"),
            })
            .collect())
    }

    async fn insert(&mut self, building: &NewBuilding) -> Result<i64, StorageError> {
        let result = sqlx::query(
            "INSERT INTO buildings (name, latitude, longitude, description, image_url)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&building.name)
        .bind(building.lat_e6)
        .bind(building.lon_e6)
        .bind(&building.description)
        .bind(&building.image_url)
        .execute(self.conn()?)
        .await
        .map_err(|e| {
            error!("Error when accessing the database: {e}");
            StorageError::SqlError(e)
        })?;
        Ok(result.last_insert_rowid())
    }

    async fn update(&mut self, id: i64, building: &NewBuilding) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE buildings
             SET name = ?, latitude = ?, longitude = ?, description = ?, image_url = ?
             WHERE id = ?",
        )
        .bind(&building.name)
        .bind(building.lat_e6)
        .bind(building.lon_e6)
        .bind(&building.description)
        .bind(&building.image_url)
        .bind(id)
        .execute(self.conn()?)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&mut self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM buildings WHERE id = ?")
            .bind(id)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
