//! Configuration constants.

/// Scale factor between microdegrees (stored) and degrees (reported).
///
/// Coordinates are persisted as integer microdegrees so repeated
/// read/write cycles never accumulate floating-point drift; accessors
/// divide by this at the boundary.
pub const MICRODEGREES_PER_DEGREE: f64 = 1_000_000.0;

/// Default database path, used when the caller does not supply one.
pub const DB_PATH: &str = "./campus_buildings.db";
