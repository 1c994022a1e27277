//! Upload pipeline: validate → store blob → resolve URL → insert record.

pub mod guard;
pub mod pipeline;
pub mod session;
pub mod types;

pub use guard::{InFlightSlot, InFlightUploads};
pub use pipeline::{UploadError, UploadPipeline};
pub use session::{schedule_close, UploadSession};
pub use types::{ImageUpload, UploadStatus};
