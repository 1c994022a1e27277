//! Upload dialog state.
//!
//! One object owns the open flag, the selected image, its extracted location and the last
//! status, so clearing them is a single transition instead of several independent resets.

use std::sync::Arc;
use std::time::Duration;

use skymap_core::{GeoCoordinate, SkyImage};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::types::{ImageUpload, UploadStatus};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UploadSession {
    open: bool,
    selected: Option<ImageUpload>,
    location: Option<GeoCoordinate>,
    status: Option<UploadStatus>,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Select a new image; any previous location and status are discarded.
    pub fn select(&mut self, image: ImageUpload) {
        self.selected = Some(image);
        self.location = None;
        self.status = None;
    }

    /// Record the extraction outcome for the selected image.
    pub fn set_location(&mut self, location: Option<GeoCoordinate>) {
        self.location = location;
        if location.is_none() {
            self.status = Some(UploadStatus::NoLocation);
        }
    }

    pub fn selected(&self) -> Option<&ImageUpload> {
        self.selected.as_ref()
    }

    pub fn location(&self) -> Option<GeoCoordinate> {
        self.location
    }

    pub fn status(&self) -> Option<UploadStatus> {
        self.status
    }

    /// An upload needs both an image and its location.
    pub fn can_upload(&self) -> bool {
        self.selected.is_some() && self.location.is_some()
    }

    /// Inputs for the pipeline. The selection stays in place so a failed upload can be retried;
    /// the returned image shares its buffer with it.
    pub fn pending(&self) -> (Option<ImageUpload>, Option<GeoCoordinate>) {
        (self.selected.clone(), self.location)
    }

    /// Record the outcome of an upload. Success clears the selection and location together.
    pub fn complete<E>(&mut self, result: &Result<SkyImage, E>) -> UploadStatus {
        let status = UploadStatus::from_result(result);
        if status.is_success() {
            self.selected = None;
            self.location = None;
        }
        self.status = Some(status);
        status
    }

    /// Clear everything except the open flag.
    pub fn reset(&mut self) {
        *self = Self {
            open: self.open,
            ..Self::default()
        };
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }
}

/// Close `session` after `delay`, leaving the status visible until then.
pub fn schedule_close(session: Arc<Mutex<UploadSession>>, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        session.lock().await.close();
        tracing::debug!("Upload dialog closed");
    })
}
