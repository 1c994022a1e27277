use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use skymap_core::models::MapView;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Initial viewport plus every stored image as a marker
#[utoipa::path(
    get,
    path = "/api/v0/map",
    tag = "map",
    responses(
        (status = 200, description = "Map view", body = MapView),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_map(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, HttpAppError> {
    let markers = state.images.list_all().await?;

    Ok(Json(MapView {
        center: state.map.center,
        zoom: state.map.zoom,
        tile_url: state.map.tile_url.clone(),
        markers,
    }))
}
