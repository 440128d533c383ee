// storage/migrations.rs
// Schema setup for the buildings table.

use sqlx::SqliteConnection;

use crate::error_handling::StorageError;

/// Creates the 'buildings' table if it doesn't exist.
///
/// Coordinates are stored as integer microdegrees; `image_url` is the only
/// nullable column.
pub async fn run_migrations(conn: &mut SqliteConnection) -> Result<(), StorageError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS buildings (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        latitude INTEGER NOT NULL,
        longitude INTEGER NOT NULL,
        description TEXT NOT NULL,
        image_url TEXT
    )",
    )
    .execute(conn)
    .await?;

    Ok(())
}
