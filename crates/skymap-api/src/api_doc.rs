//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use skymap_core::models;

/// Returns the OpenAPI spec served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SkyMap API",
        version = "0.1.0",
        description = "Upload geotagged sky photos and browse them as map markers. The location is read from the image's EXIF GPS tags; images without it are rejected. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::images::upload_image,
        handlers::images::preview_location,
        handlers::images::list_images,
        handlers::images::get_image,
        handlers::map::get_map,
    ),
    components(schemas(
        models::GeoCoordinate,
        models::SkyImage,
        models::MapView,
        error::ErrorResponse,
    )),
    tags(
        (name = "images", description = "Image upload and retrieval"),
        (name = "map", description = "Map view data")
    )
)]
pub struct ApiDoc;
