//! Database repositories for data access layer
//!
//! The upload pipeline and the read handlers depend on the `SkyImageStore` trait, not on the
//! PostgreSQL repository directly, so they can run against an in-memory store in tests.

pub mod sky_image;

pub use sky_image::{SkyImageRepository, SkyImageStore};
