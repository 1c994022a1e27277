//! Persisted image record.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::geo::GeoCoordinate;

/// One row of the `images` table.
///
/// Created once per successful upload and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SkyImage {
    pub id: i64,
    pub image_url: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl SkyImage {
    pub fn coordinate(&self) -> GeoCoordinate {
        GeoCoordinate::new(self.latitude, self.longitude)
    }
}

/// Insert payload for a new record.
///
/// Holding a `GeoCoordinate` (not two optionals) means a record without both coordinates
/// cannot be expressed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSkyImage {
    pub image_url: String,
    pub coordinate: GeoCoordinate,
}

impl NewSkyImage {
    pub fn new(image_url: impl Into<String>, coordinate: GeoCoordinate) -> Self {
        Self {
            image_url: image_url.into(),
            coordinate,
        }
    }
}
