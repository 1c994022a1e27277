//! SkyMap API Library
//!
//! This crate provides the HTTP handlers, middleware and application setup for the SkyMap
//! service.

mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
pub mod setup;
mod telemetry;
mod utils;

pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
