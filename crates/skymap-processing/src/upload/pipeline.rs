//! Upload pipeline: validate → store blob → resolve public URL → insert record.
//!
//! Every step short-circuits on failure. There is no retry and no timeout beyond what the
//! collaborators impose. Whether a blob survives a failed insert is decided by
//! [`OrphanPolicy`].

use std::sync::Arc;

use skymap_core::{AppError, GeoCoordinate, NewSkyImage, OrphanPolicy, SkyImage};
use skymap_db::SkyImageStore;
use skymap_storage::{generate_storage_key, Storage, StorageError};
use thiserror::Error;

use super::guard::InFlightUploads;
use super::types::ImageUpload;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Missing image or location data")]
    MissingLocationData,

    #[error("Storage write failed: {0}")]
    StorageWriteFailed(#[source] StorageError),

    #[error("Record insert failed: {0}")]
    RecordInsertFailed(#[source] AppError),

    #[error("Upload of this image is already in progress")]
    DuplicateUpload,
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        let message = err.to_string();
        match err {
            UploadError::MissingLocationData => AppError::MissingLocationData,
            UploadError::StorageWriteFailed(e) => AppError::StorageWriteFailed(e.to_string()),
            UploadError::RecordInsertFailed(e) => AppError::RecordInsertFailed(e.to_string()),
            UploadError::DuplicateUpload => AppError::DuplicateUpload(message),
        }
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Clone)]
pub struct UploadPipeline {
    storage: Arc<dyn Storage>,
    records: Arc<dyn SkyImageStore>,
    orphan_policy: OrphanPolicy,
    in_flight: InFlightUploads,
    clock: fn() -> i64,
}

impl UploadPipeline {
    pub fn new(storage: Arc<dyn Storage>, records: Arc<dyn SkyImageStore>) -> Self {
        Self {
            storage,
            records,
            orphan_policy: OrphanPolicy::default(),
            in_flight: InFlightUploads::new(),
            clock: now_millis,
        }
    }

    pub fn with_orphan_policy(mut self, policy: OrphanPolicy) -> Self {
        self.orphan_policy = policy;
        self
    }

    /// Replace the millisecond clock used for storage keys.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn orphan_policy(&self) -> OrphanPolicy {
        self.orphan_policy
    }

    pub fn in_flight(&self) -> &InFlightUploads {
        &self.in_flight
    }

    /// Store `image` and record it at `coordinate`.
    ///
    /// Both inputs must be present; otherwise nothing is written and
    /// `MissingLocationData` is returned.
    pub async fn upload(
        &self,
        image: Option<ImageUpload>,
        coordinate: Option<GeoCoordinate>,
    ) -> Result<SkyImage, UploadError> {
        let (image, coordinate) = match (image, coordinate) {
            (Some(image), Some(coordinate)) => (image, coordinate),
            _ => return Err(UploadError::MissingLocationData),
        };

        let key = generate_storage_key((self.clock)(), &image.filename);
        let size = image.size();
        let start = std::time::Instant::now();

        self.storage
            .upload_with_key(&key, Vec::from(image.data), &image.content_type)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = %key, size_bytes = size, "Image store failed");
                UploadError::StorageWriteFailed(e)
            })?;

        let image_url = self.storage.public_url(&key);

        let record = match self
            .records
            .insert(NewSkyImage::new(image_url, coordinate))
            .await
        {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Image record insert failed");
                self.handle_orphan(&key).await;
                return Err(UploadError::RecordInsertFailed(e));
            }
        };

        tracing::info!(
            image_id = record.id,
            key = %key,
            size_bytes = size,
            latitude = record.latitude,
            longitude = record.longitude,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image uploaded"
        );

        Ok(record)
    }

    /// [`UploadPipeline::upload`] behind the in-flight guard: a second submission of the
    /// same bytes from the same session fails with `DuplicateUpload` while the first runs.
    pub async fn upload_for_session(
        &self,
        session_key: &str,
        image: Option<ImageUpload>,
        coordinate: Option<GeoCoordinate>,
    ) -> Result<SkyImage, UploadError> {
        let digest = match &image {
            Some(image) => InFlightUploads::digest(&image.data),
            None => return Err(UploadError::MissingLocationData),
        };

        let _slot = self
            .in_flight
            .try_acquire(session_key, digest)
            .ok_or_else(|| {
                tracing::debug!(session = %session_key, "Duplicate upload rejected");
                UploadError::DuplicateUpload
            })?;

        self.upload(image, coordinate).await
    }

    async fn handle_orphan(&self, key: &str) {
        match self.orphan_policy {
            OrphanPolicy::Retain => {
                tracing::warn!(key = %key, "Blob left without a record");
            }
            OrphanPolicy::Compensate => {
                if let Err(e) = self.storage.delete(key).await {
                    tracing::error!(error = %e, key = %key, "Failed to delete orphaned blob");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockSkyImageStore, MockStorage};
    use skymap_core::ErrorMetadata;

    const T: i64 = 1700000000000;

    fn fixed_clock() -> i64 {
        T
    }

    fn photo() -> ImageUpload {
        ImageUpload::new("photo.jpg", "image/jpeg", b"jpeg bytes".to_vec())
    }

    fn pipeline(
        storage: &Arc<MockStorage>,
        records: &Arc<MockSkyImageStore>,
    ) -> UploadPipeline {
        UploadPipeline::new(storage.clone(), records.clone()).with_clock(fixed_clock)
    }

    #[tokio::test]
    async fn test_missing_inputs_touch_no_store() {
        let storage = Arc::new(MockStorage::new());
        let records = Arc::new(MockSkyImageStore::new());
        let pipeline = pipeline(&storage, &records);

        let result = pipeline
            .upload(None, Some(GeoCoordinate::new(1.0, 2.0)))
            .await;
        assert!(matches!(result, Err(UploadError::MissingLocationData)));

        let result = pipeline.upload(Some(photo()), None).await;
        assert!(matches!(result, Err(UploadError::MissingLocationData)));

        assert_eq!(storage.write_calls(), 0);
        assert_eq!(records.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_success_records_exact_coordinate() {
        let storage = Arc::new(MockStorage::new());
        let records = Arc::new(MockSkyImageStore::new());
        let pipeline = pipeline(&storage, &records);

        let record = pipeline
            .upload(Some(photo()), Some(GeoCoordinate::new(28.6, 77.2)))
            .await
            .unwrap();

        assert_eq!(record.latitude, 28.6);
        assert_eq!(record.longitude, 77.2);
        assert_eq!(
            record.image_url,
            format!("{}/sky-images/{}-photo.jpg", MockStorage::BASE_URL, T)
        );
        assert_eq!(storage.keys(), vec![format!("sky-images/{}-photo.jpg", T)]);
        assert_eq!(records.rows(), vec![record]);
    }

    #[tokio::test]
    async fn test_out_of_range_coordinate_passes_through() {
        let storage = Arc::new(MockStorage::new());
        let records = Arc::new(MockSkyImageStore::new());
        let pipeline = pipeline(&storage, &records);

        let record = pipeline
            .upload(Some(photo()), Some(GeoCoordinate::new(200.0, -300.0)))
            .await
            .unwrap();

        assert_eq!(record.coordinate(), GeoCoordinate::new(200.0, -300.0));
    }

    #[tokio::test]
    async fn test_storage_failure_skips_insert() {
        let storage = Arc::new(MockStorage::failing());
        let records = Arc::new(MockSkyImageStore::new());
        let pipeline = pipeline(&storage, &records);

        let result = pipeline
            .upload(Some(photo()), Some(GeoCoordinate::new(1.0, 2.0)))
            .await;

        assert!(matches!(result, Err(UploadError::StorageWriteFailed(_))));
        assert_eq!(records.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_insert_failure_retains_blob_by_default() {
        let storage = Arc::new(MockStorage::new());
        let records = Arc::new(MockSkyImageStore::failing());
        let pipeline = pipeline(&storage, &records);

        let result = pipeline
            .upload(Some(photo()), Some(GeoCoordinate::new(1.0, 2.0)))
            .await;

        assert!(matches!(result, Err(UploadError::RecordInsertFailed(_))));
        let key = format!("sky-images/{}-photo.jpg", T);
        assert!(storage.exists(&key).await.unwrap());
        assert!(records.rows().is_empty());
    }

    #[tokio::test]
    async fn test_insert_failure_with_compensation_deletes_blob() {
        let storage = Arc::new(MockStorage::new());
        let records = Arc::new(MockSkyImageStore::failing());
        let pipeline = pipeline(&storage, &records).with_orphan_policy(OrphanPolicy::Compensate);

        let result = pipeline
            .upload(Some(photo()), Some(GeoCoordinate::new(1.0, 2.0)))
            .await;

        assert!(matches!(result, Err(UploadError::RecordInsertFailed(_))));
        assert!(storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_session_upload_releases_slot() {
        let storage = Arc::new(MockStorage::new());
        let records = Arc::new(MockSkyImageStore::new());
        let pipeline = pipeline(&storage, &records);

        pipeline
            .upload_for_session("s1", Some(photo()), Some(GeoCoordinate::new(1.0, 2.0)))
            .await
            .unwrap();
        assert!(pipeline.in_flight().is_empty());

        // Sequential resubmission is allowed and creates a second row
        pipeline
            .upload_for_session("s1", Some(photo()), Some(GeoCoordinate::new(1.0, 2.0)))
            .await
            .unwrap();
        assert_eq!(records.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_session_upload_rejects_in_flight_duplicate() {
        let storage = Arc::new(MockStorage::new());
        let records = Arc::new(MockSkyImageStore::new());
        let pipeline = pipeline(&storage, &records);

        let held = pipeline
            .in_flight()
            .try_acquire("s1", InFlightUploads::digest(&photo().data));
        assert!(held.is_some());

        let result = pipeline
            .upload_for_session("s1", Some(photo()), Some(GeoCoordinate::new(1.0, 2.0)))
            .await;
        assert!(matches!(result, Err(UploadError::DuplicateUpload)));
        assert_eq!(storage.write_calls(), 0);
    }

    #[test]
    fn test_upload_error_maps_to_app_error() {
        let err: AppError = UploadError::MissingLocationData.into();
        assert_eq!(err.error_code(), "MISSING_LOCATION_DATA");

        let err: AppError =
            UploadError::StorageWriteFailed(StorageError::UploadFailed("denied".into())).into();
        assert_eq!(err.http_status_code(), 502);

        let err: AppError =
            UploadError::RecordInsertFailed(AppError::Internal("down".into())).into();
        assert_eq!(err.error_code(), "RECORD_INSERT_FAILED");

        let err: AppError = UploadError::DuplicateUpload.into();
        assert_eq!(err.http_status_code(), 409);
    }
}
