//! SkyMap Processing Library
//!
//! Geolocation extraction from image metadata and the upload pipeline that turns a located
//! image into a stored blob plus an `images` row.

pub mod geo;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod upload;

pub use geo::{convert_dms_to_dd, GeoError, GeoExtractor};
pub use upload::{
    schedule_close, ImageUpload, InFlightUploads, UploadError, UploadPipeline, UploadSession,
    UploadStatus,
};
