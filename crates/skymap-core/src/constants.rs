//! Constants shared across crates.

use std::time::Duration;

/// Prefix of every object key written by the upload pipeline.
pub const STORAGE_KEY_PREFIX: &str = "sky-images";

/// Relational table holding one row per uploaded image.
pub const IMAGES_TABLE: &str = "images";

/// Grace period between a successful upload and the dialog closing.
pub const DIALOG_CLOSE_DELAY: Duration = Duration::from_secs(1);

/// Default map view: centred on the Indian subcontinent.
pub const DEFAULT_MAP_CENTER_LAT: f64 = 20.5937;
pub const DEFAULT_MAP_CENTER_LON: f64 = 78.9629;
pub const DEFAULT_MAP_ZOOM: u8 = 5;
pub const DEFAULT_MAP_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Status lines reported to the user after an upload attempt.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Image uploaded successfully!";
pub const UPLOAD_FAILURE_MESSAGE: &str = "Upload failed. Try again.";
pub const NO_LOCATION_MESSAGE: &str = "This image does not contain location data.";
pub const MISSING_LOCATION_MESSAGE: &str = "Cannot upload an image without location data.";
