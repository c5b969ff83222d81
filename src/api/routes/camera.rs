//! Camera page route polled by meeting bots.

use crate::service::BotService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::debug;

pub fn router(service: BotService) -> Router {
    Router::new()
        .route("/camera/:page_id", get(camera_page))
        .with_state(service)
}

/// GET /camera/:page_id - Serve a registered camera page.
async fn camera_page(State(service): State<BotService>, Path(page_id): Path<String>) -> Response {
    match service.camera_page(&page_id).await {
        Ok(html) => Html(html.to_string()).into_response(),
        Err(_) => {
            debug!("Unknown camera page requested: {}", page_id);
            (StatusCode::NOT_FOUND, "Camera page not found").into_response()
        }
    }
}
