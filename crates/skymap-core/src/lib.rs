//! SkyMap Core Library
//!
//! This crate provides the domain models, error types and configuration shared by every
//! SkyMap component: the geo coordinate types, the persisted image record, the
//! `AppError` taxonomy and the environment-driven `Config`.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, MapConfig, OrphanPolicy};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{GeoCoordinate, MapView, NewSkyImage, RawGeoTag, SkyImage};
pub use storage_types::StorageBackend;
