//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use skymap_core::Config;
use skymap_db::SkyImageRepository;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;
    let images = Arc::new(SkyImageRepository::new(pool));

    let state = Arc::new(AppState::new(config.clone(), storage, images));
    tracing::info!(
        orphan_policy = ?state.pipeline.orphan_policy(),
        "Upload pipeline ready"
    );

    let router = routes::setup_routes(&config, state.clone()).await?;

    Ok((state, router))
}
