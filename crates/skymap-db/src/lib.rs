//! SkyMap database layer: repositories over the `images` table.

pub mod db;

pub use db::{SkyImageRepository, SkyImageStore};
