//! GIF asset listing.

use crate::api::error::ApiResult;
use crate::assets::GifAsset;
use crate::service::BotService;
use axum::{extract::State, response::Json, routing::get, Router};

pub fn router(service: BotService) -> Router {
    Router::new()
        .route("/api/gifs", get(list_gifs))
        .with_state(service)
}

/// GET /api/gifs - List GIFs available as bot cameras.
async fn list_gifs(State(service): State<BotService>) -> ApiResult<Json<Vec<GifAsset>>> {
    Ok(Json(service.list_assets()?))
}
