//! Application state shared by every handler.

use skymap_core::{Config, MapConfig};
use skymap_db::SkyImageStore;
use skymap_processing::UploadPipeline;
use skymap_storage::Storage;
use std::sync::Arc;

/// Upload limits applied before any metadata is read.
#[derive(Clone, Debug)]
pub struct UploadLimits {
    pub max_file_size: usize,
    pub allowed_content_types: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub images: Arc<dyn SkyImageStore>,
    pub pipeline: UploadPipeline,
    pub upload: UploadLimits,
    pub map: MapConfig,
}

impl AppState {
    /// Wire the pipeline from its collaborators using the configured orphan policy.
    pub fn new(config: Config, storage: Arc<dyn Storage>, images: Arc<dyn SkyImageStore>) -> Self {
        let pipeline = UploadPipeline::new(storage.clone(), images.clone())
            .with_orphan_policy(config.orphan_policy);

        Self {
            upload: UploadLimits {
                max_file_size: config.max_file_size_bytes,
                allowed_content_types: config.allowed_content_types.clone(),
            },
            map: config.map.clone(),
            config,
            storage,
            images,
            pipeline,
        }
    }
}
