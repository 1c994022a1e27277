//! Geographic coordinate types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A position in signed decimal degrees.
///
/// Values are never clamped: whatever the conversion produced is carried through to the
/// stored record unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Degrees/minutes/seconds triple plus hemisphere reference, as read from EXIF.
///
/// Only lives between tag lookup and conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGeoTag {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
    /// `N`/`S` for latitude, `E`/`W` for longitude.
    pub reference: String,
}

impl RawGeoTag {
    pub fn new(dms: [f64; 3], reference: impl Into<String>) -> Self {
        Self {
            degrees: dms[0],
            minutes: dms[1],
            seconds: dms[2],
            reference: reference.into(),
        }
    }

    pub fn dms(&self) -> [f64; 3] {
        [self.degrees, self.minutes, self.seconds]
    }
}
