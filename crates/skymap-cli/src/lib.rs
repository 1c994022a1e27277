use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use skymap_api_client::content_type_for;
use skymap_processing::{GeoExtractor, ImageUpload, UploadSession};

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Read a local file into an upload handle.
pub fn read_image(path: &Path) -> anyhow::Result<ImageUpload> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image.jpg");

    Ok(ImageUpload::new(filename, content_type_for(path), data))
}

/// Select `path` in `session` and record its extracted location.
///
/// A file without GPS tags leaves the session in the no-location state; unreadable
/// metadata is an error.
pub fn stage_image(session: &mut UploadSession, path: &Path) -> anyhow::Result<()> {
    let image = read_image(path)?;
    let location = GeoExtractor::extract(&image.data)
        .with_context(|| format!("Could not read metadata of {}", path.display()))?;

    session.select(image);
    session.set_location(location);
    Ok(())
}
