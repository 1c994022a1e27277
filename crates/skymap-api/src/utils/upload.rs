//! Common utilities for file upload handlers

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::body::Bytes;
use axum::http::StatusCode;
use skymap_core::AppError;
use skymap_processing::ImageUpload;

fn multipart_error(err: MultipartError, what: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", what, err.body_text()))
    } else {
        AppError::InvalidInput(format!("{}: {}", what, err.body_text()))
    }
}

/// Extract the image from a multipart form.
/// Only one field named "file" is accepted; multiple file fields are rejected.
pub async fn extract_multipart_file(mut multipart: Multipart) -> Result<ImageUpload, AppError> {
    let mut file_data: Option<Bytes> = None;
    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to read multipart"))?
    {
        if field.name() != Some("file") {
            continue;
        }

        if file_data.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }
        filename = field.file_name().map(|s| s.to_string());
        content_type = field.content_type().map(|s| s.to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, "Failed to read file data"))?;

        file_data = Some(data);
    }

    let data = file_data.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;
    if data.is_empty() {
        return Err(AppError::InvalidInput("File is empty".to_string()));
    }

    Ok(ImageUpload::new(
        filename.unwrap_or_else(|| "unknown".to_string()),
        content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
        data,
    ))
}

/// Validate file size
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size exceeds maximum allowed size of {} bytes",
            max_size
        )));
    }
    Ok(())
}

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Validate content type against allowlist. Compares normalized MIME type only.
pub fn validate_content_type(content_type: &str, allowed_types: &[String]) -> Result<(), AppError> {
    let normalized = normalize_mime_type(content_type).to_lowercase();
    if !allowed_types.iter().any(|ct| normalized == ct.to_lowercase()) {
        return Err(AppError::InvalidInput(format!(
            "Invalid content type. Allowed types: {}",
            allowed_types.join(", ")
        )));
    }
    Ok(())
}
