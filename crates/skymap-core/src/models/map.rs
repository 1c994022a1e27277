//! Map view payload consumed by map front-ends.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::geo::GeoCoordinate;
use super::sky_image::SkyImage;

/// Initial viewport plus every stored image as a marker.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MapView {
    pub center: GeoCoordinate,
    pub zoom: u8,
    /// Slippy-map tile template (`{s}`, `{z}`, `{x}`, `{y}` placeholders).
    pub tile_url: String,
    pub markers: Vec<SkyImage>,
}
