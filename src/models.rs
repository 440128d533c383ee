//! Building record types.

use serde::{Deserialize, Serialize};

use crate::config::MICRODEGREES_PER_DEGREE;

/// A campus building as stored in the database.
///
/// Coordinates are integer microdegrees (degrees scaled by 1,000,000);
/// use [`Building::lat`] / [`Building::lon`] for degree values. The
/// identifier is assigned by the store on insert and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Store-assigned row identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Latitude in microdegrees.
    pub lat_e6: i32,
    /// Longitude in microdegrees.
    pub lon_e6: i32,
    /// Free-text description.
    pub description: String,
    /// Optional image reference URL.
    pub image_url: Option<String>,
}

impl Building {
    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        f64::from(self.lat_e6) / MICRODEGREES_PER_DEGREE
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        f64::from(self.lon_e6) / MICRODEGREES_PER_DEGREE
    }
}

/// Field set for a building being created or updated (no identifier yet).
///
/// Latitude and longitude are always supplied together; there is no
/// partial coordinate write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBuilding {
    /// Display name.
    pub name: String,
    /// Latitude in microdegrees.
    pub lat_e6: i32,
    /// Longitude in microdegrees.
    pub lon_e6: i32,
    /// Free-text description.
    pub description: String,
    /// Optional image reference URL.
    pub image_url: Option<String>,
}

impl NewBuilding {
    /// Attaches a store-assigned identifier, producing a full record.
    pub fn with_id(&self, id: i64) -> Building {
        Building {
            id,
            name: self.name.clone(),
            lat_e6: self.lat_e6,
            lon_e6: self.lon_e6,
            description: self.description.clone(),
            image_url: self.image_url.clone(),
        }
    }
}
