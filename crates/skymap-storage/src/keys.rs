//! Key generation for uploaded images.

use skymap_core::constants::STORAGE_KEY_PREFIX;

/// Build the object key for an upload made at `millis` (ms since the Unix epoch).
///
/// Produces `sky-images/{millis}-{filename}`. The filename is not sanitised; two uploads
/// of the same name within the same millisecond collide.
pub fn generate_storage_key(millis: i64, filename: &str) -> String {
    format!("{}/{}-{}", STORAGE_KEY_PREFIX, millis, filename)
}

/// A key is usable by a backend unless it is empty, absolute, or has a `..` segment.
///
/// Only whole segments count: `IMG_0001..jpg` is an ordinary filename.
pub fn is_valid_key(storage_key: &str) -> bool {
    !storage_key.is_empty()
        && !storage_key.starts_with('/')
        && !storage_key.split('/').any(|segment| segment == "..")
}
