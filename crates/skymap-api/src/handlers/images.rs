use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use skymap_core::{AppError, GeoCoordinate, SkyImage};
use skymap_processing::{GeoExtractor, ImageUpload};

use crate::constants::SESSION_HEADER;
use crate::error::{ErrorResponse, HttpAppError};
use crate::middleware::RequestId;
use crate::state::AppState;
use crate::utils::upload::{extract_multipart_file, validate_content_type, validate_file_size};

/// Read the multipart image, enforce limits, and extract its location.
async fn read_located_image(
    state: &AppState,
    multipart: Multipart,
) -> Result<(ImageUpload, GeoCoordinate), HttpAppError> {
    let image = extract_multipart_file(multipart).await?;
    validate_file_size(image.size(), state.upload.max_file_size)?;
    validate_content_type(&image.content_type, &state.upload.allowed_content_types)?;

    let coordinate = GeoExtractor::extract_async(image.data.clone())
        .await?
        .ok_or(AppError::NoLocationData)?;

    Ok((image, coordinate))
}

/// Upload a located image
///
/// Extracts the embedded GPS position, stores the file and records it. Images without
/// location data are rejected before anything is written. When `X-Session-Id` is sent, a
/// second submission of the same bytes from that session fails while the first is running.
#[utoipa::path(
    post,
    path = "/api/v0/images",
    tag = "images",
    params(
        ("X-Session-Id" = Option<String>, Header, description = "Session key for duplicate-submission protection")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image uploaded", body = SkyImage),
        (status = 400, description = "Invalid input or unreadable metadata", body = ErrorResponse),
        (status = 409, description = "Same image already uploading in this session", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "Image has no location data", body = ErrorResponse),
        (status = 500, description = "Record insert failed", body = ErrorResponse),
        (status = 502, description = "Storage write failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers, request_id, multipart), fields(operation = "upload_image"))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    request_id: Option<Extension<RequestId>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let (image, coordinate) = read_located_image(&state, multipart).await?;

    let session = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty());

    tracing::debug!(
        request_id = request_id.as_ref().map(|Extension(id)| id.0.as_str()),
        filename = %image.filename,
        size_bytes = image.size(),
        latitude = coordinate.latitude,
        longitude = coordinate.longitude,
        "Located image ready for upload"
    );

    let record = match session {
        Some(session) => {
            state
                .pipeline
                .upload_for_session(session, Some(image), Some(coordinate))
                .await?
        }
        None => state.pipeline.upload(Some(image), Some(coordinate)).await?,
    };

    Ok((StatusCode::CREATED, Json(record)))
}

/// Preview the location embedded in an image without storing anything
#[utoipa::path(
    post,
    path = "/api/v0/images/location",
    tag = "images",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Location found", body = GeoCoordinate),
        (status = 400, description = "Invalid input or unreadable metadata", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "Image has no location data", body = ErrorResponse)
    )
)]
pub async fn preview_location(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let (_, coordinate) = read_located_image(&state, multipart).await?;
    Ok(Json(coordinate))
}

#[utoipa::path(
    get,
    path = "/api/v0/images",
    tag = "images",
    responses(
        (status = 200, description = "All stored images", body = Vec<SkyImage>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_images"))]
pub async fn list_images(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let images = state.images.list_all().await?;
    Ok(Json(images))
}

#[utoipa::path(
    get,
    path = "/api/v0/images/{id}",
    tag = "images",
    params(
        ("id" = i64, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image found", body = SkyImage),
        (status = 404, description = "Image not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(image_id = id, operation = "get_image"))]
pub async fn get_image(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let image = state
        .images
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    Ok(Json(image))
}
