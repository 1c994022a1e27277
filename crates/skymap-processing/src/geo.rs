//! Geolocation extraction from EXIF metadata.
//!
//! Reads the four GPS tags (`GPSLatitude`, `GPSLongitude` and their `Ref` companions) from
//! the primary IFD and converts the degrees/minutes/seconds triples to signed decimal
//! degrees. A missing tag is an expected outcome and yields `None`; only bytes the reader
//! cannot parse are an error.

use std::io::Cursor;

use bytes::Bytes;
use exif::{Exif, In, Reader, Tag, Value};
use skymap_core::{AppError, GeoCoordinate, RawGeoTag};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Failed to read image metadata: {0}")]
    ReadFailure(#[source] exif::Error),

    #[error("Metadata reader task failed: {0}")]
    TaskFailed(String),
}

impl From<GeoError> for AppError {
    fn from(err: GeoError) -> Self {
        match err {
            GeoError::ReadFailure(_) => AppError::MetadataReadFailure(err.to_string()),
            // The worker panicked or was cancelled; the image is not at fault.
            GeoError::TaskFailed(_) => AppError::Internal(err.to_string()),
        }
    }
}

/// `degrees + minutes/60 + seconds/3600`, negated when `reference` is exactly `"S"` or `"W"`.
///
/// The comparison is case-sensitive and the result is neither rounded nor clamped.
pub fn convert_dms_to_dd(dms: [f64; 3], reference: &str) -> f64 {
    let [degrees, minutes, seconds] = dms;
    let decimal = degrees + minutes / 60.0 + seconds / 3600.0;
    if reference == "S" || reference == "W" {
        -decimal
    } else {
        decimal
    }
}

/// Stateless EXIF GPS reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoExtractor;

impl GeoExtractor {
    /// Extract the embedded coordinate from `bytes`.
    ///
    /// Returns `Ok(None)` when the image has no EXIF block or lacks any of the four GPS
    /// tags, and `Err(GeoError::ReadFailure)` when the container cannot be parsed.
    pub fn extract(bytes: &[u8]) -> Result<Option<GeoCoordinate>, GeoError> {
        let tags = Self::read_geo_tags(bytes)?;

        Ok(tags.map(|(latitude, longitude)| {
            GeoCoordinate::new(
                convert_dms_to_dd(latitude.dms(), &latitude.reference),
                convert_dms_to_dd(longitude.dms(), &longitude.reference),
            )
        }))
    }

    /// Same as [`GeoExtractor::extract`], run on the blocking pool.
    pub async fn extract_async(bytes: Bytes) -> Result<Option<GeoCoordinate>, GeoError> {
        tokio::task::spawn_blocking(move || Self::extract(&bytes))
            .await
            .map_err(|e| GeoError::TaskFailed(e.to_string()))?
    }

    /// Raw latitude and longitude tags, or `None` if any of the four is absent.
    pub fn read_geo_tags(bytes: &[u8]) -> Result<Option<(RawGeoTag, RawGeoTag)>, GeoError> {
        let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => {
                tracing::debug!(size_bytes = bytes.len(), "Image carries no EXIF block");
                return Ok(None);
            }
            Err(e) => return Err(GeoError::ReadFailure(e)),
        };

        let latitude = read_tag(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef);
        let longitude = read_tag(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef);

        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Ok(Some((latitude, longitude))),
            _ => {
                tracing::debug!("Image EXIF lacks GPS tags");
                Ok(None)
            }
        }
    }
}

fn read_tag(exif: &Exif, value_tag: Tag, ref_tag: Tag) -> Option<RawGeoTag> {
    let dms = read_dms(&exif.get_field(value_tag, In::PRIMARY)?.value)?;
    let reference = read_ascii(&exif.get_field(ref_tag, In::PRIMARY)?.value)?;
    Some(RawGeoTag::new(dms, reference))
}

// Fewer than three rationals counts as missing.
fn read_dms(value: &Value) -> Option<[f64; 3]> {
    match value {
        Value::Rational(parts) if parts.len() >= 3 => {
            Some([parts[0].to_f64(), parts[1].to_f64(), parts[2].to_f64()])
        }
        _ => None,
    }
}

fn read_ascii(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(strings) => strings
            .first()
            .map(|s| String::from_utf8_lossy(s).trim_end_matches('\0').to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gps_tiff, tiff_without_gps, GpsFixture};
    use skymap_core::ErrorMetadata;

    #[test]
    fn test_convert_north() {
        assert_eq!(convert_dms_to_dd([28.0, 36.0, 0.0], "N"), 28.6);
    }

    #[test]
    fn test_convert_south_and_west_negate() {
        assert_eq!(convert_dms_to_dd([28.0, 36.0, 0.0], "S"), -28.6);
        assert_eq!(convert_dms_to_dd([77.0, 12.0, 0.0], "W"), -77.2);
    }

    #[test]
    fn test_convert_other_references_stay_positive() {
        assert_eq!(convert_dms_to_dd([77.0, 12.0, 0.0], "E"), 77.2);
        assert_eq!(convert_dms_to_dd([28.0, 36.0, 0.0], "s"), 28.6);
        assert_eq!(convert_dms_to_dd([28.0, 36.0, 0.0], ""), 28.6);
    }

    #[test]
    fn test_convert_is_not_clamped() {
        assert_eq!(convert_dms_to_dd([200.0, 0.0, 0.0], "N"), 200.0);
    }

    #[test]
    fn test_extract_full_gps() {
        let bytes = gps_tiff(GpsFixture::delhi());

        let coordinate = GeoExtractor::extract(&bytes).unwrap().unwrap();
        assert_eq!(coordinate, GeoCoordinate::new(28.6, 77.2));
    }

    #[test]
    fn test_extract_southern_western_hemisphere() {
        let bytes = gps_tiff(GpsFixture {
            latitude_ref: Some("S"),
            longitude_ref: Some("W"),
            ..GpsFixture::delhi()
        });

        let coordinate = GeoExtractor::extract(&bytes).unwrap().unwrap();
        assert_eq!(coordinate, GeoCoordinate::new(-28.6, -77.2));
    }

    #[test]
    fn test_extract_any_missing_tag_is_none() {
        let cases = [
            GpsFixture {
                latitude: None,
                ..GpsFixture::delhi()
            },
            GpsFixture {
                longitude: None,
                ..GpsFixture::delhi()
            },
            GpsFixture {
                latitude_ref: None,
                ..GpsFixture::delhi()
            },
            GpsFixture {
                longitude_ref: None,
                ..GpsFixture::delhi()
            },
        ];

        for fixture in cases {
            let bytes = gps_tiff(fixture);
            assert_eq!(GeoExtractor::extract(&bytes).unwrap(), None);
        }
    }

    #[test]
    fn test_extract_exif_without_gps_is_none() {
        assert_eq!(GeoExtractor::extract(&tiff_without_gps()).unwrap(), None);
    }

    #[test]
    fn test_extract_without_exif_block_is_none() {
        // SOI then straight into scan data: no APP1 segment
        let bytes = [0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x02, 0xFF, 0xD9];
        assert_eq!(GeoExtractor::extract(&bytes).unwrap(), None);
    }

    #[test]
    fn test_extract_unreadable_bytes_is_error() {
        let result = GeoExtractor::extract(b"definitely not an image");
        assert!(matches!(result, Err(GeoError::ReadFailure(_))));

        let app_error: AppError = result.unwrap_err().into();
        assert!(matches!(app_error, AppError::MetadataReadFailure(_)));
    }

    #[test]
    fn test_task_failure_is_internal_not_metadata() {
        let app_error: AppError = GeoError::TaskFailed("task panicked".to_string()).into();
        assert!(matches!(app_error, AppError::Internal(_)));
        assert_eq!(app_error.http_status_code(), 500);
    }

    #[tokio::test]
    async fn test_extract_async_matches_sync() {
        let bytes = gps_tiff(GpsFixture::delhi());

        let coordinate = GeoExtractor::extract_async(Bytes::from(bytes)).await.unwrap();
        assert_eq!(coordinate, Some(GeoCoordinate::new(28.6, 77.2)));
    }
}
