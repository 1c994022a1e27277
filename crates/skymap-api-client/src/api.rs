//! Domain methods for the SkyMap API client.

use std::path::{Component, Path};

use anyhow::{Context, Result};
use bytes::Bytes;

use crate::{ApiClient, GeoCoordinate, MapView, SkyImage, API_PREFIX};

/// MIME type for an image path, by extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => "application/octet-stream",
    }
}

fn image_form(path: &Path) -> Result<reqwest::multipart::Form> {
    if path.components().any(|c| c == Component::ParentDir) {
        return Err(anyhow::anyhow!("Invalid input: {}", path.display()));
    }

    let buffer = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image.jpg");

    let part = reqwest::multipart::Part::bytes(buffer)
        .file_name(filename.to_string())
        .mime_str(content_type_for(path))
        .context("Invalid content type")?;

    Ok(reqwest::multipart::Form::new().part("file", part))
}

impl ApiClient {
    /// Upload an image from a local file path. With `session`, the server rejects a
    /// concurrent resubmission of the same bytes.
    pub async fn upload_image(&self, path: &Path, session: Option<&str>) -> Result<SkyImage> {
        let form = image_form(path)?;
        self.post_multipart(&format!("{}/images", API_PREFIX), form, session)
            .await
    }

    /// Upload image bytes already held in memory.
    pub async fn upload_bytes(
        &self,
        filename: &str,
        content_type: &str,
        data: Bytes,
        session: Option<&str>,
    ) -> Result<SkyImage> {
        let length = data.len() as u64;
        let part = reqwest::multipart::Part::stream_with_length(data, length)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .context("Invalid content type")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        self.post_multipart(&format!("{}/images", API_PREFIX), form, session)
            .await
    }

    /// Ask the server for the location embedded in a local image without storing it.
    pub async fn preview_location(&self, path: &Path) -> Result<GeoCoordinate> {
        let form = image_form(path)?;
        self.post_multipart(&format!("{}/images/location", API_PREFIX), form, None)
            .await
    }

    pub async fn list_images(&self) -> Result<Vec<SkyImage>> {
        self.get(&format!("{}/images", API_PREFIX)).await
    }

    pub async fn get_image(&self, id: i64) -> Result<SkyImage> {
        self.get(&format!("{}/images/{}", API_PREFIX, id)).await
    }

    pub async fn get_map(&self) -> Result<MapView> {
        self.get(&format!("{}/map", API_PREFIX)).await
    }
}
