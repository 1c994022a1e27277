//! Types for the upload pipeline.

use bytes::Bytes;
use serde::Serialize;
use skymap_core::constants::{NO_LOCATION_MESSAGE, UPLOAD_FAILURE_MESSAGE, UPLOAD_SUCCESS_MESSAGE};
use skymap_core::SkyImage;

/// An image held in memory between selection and upload.
///
/// Clones share one buffer, so handing the image to the metadata reader or keeping it in a
/// session for retry does not copy the bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageUpload {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Short status line shown to the user after a selection or upload attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Uploaded,
    Failed,
    NoLocation,
}

impl UploadStatus {
    pub fn from_result<E>(result: &Result<SkyImage, E>) -> Self {
        match result {
            Ok(_) => UploadStatus::Uploaded,
            Err(_) => UploadStatus::Failed,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            UploadStatus::Uploaded => UPLOAD_SUCCESS_MESSAGE,
            UploadStatus::Failed => UPLOAD_FAILURE_MESSAGE,
            UploadStatus::NoLocation => NO_LOCATION_MESSAGE,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadStatus::Uploaded)
    }
}
