//! Domain models.

pub mod geo;
pub mod map;
pub mod sky_image;

pub use geo::{GeoCoordinate, RawGeoTag};
pub use map::MapView;
pub use sky_image::{NewSkyImage, SkyImage};
