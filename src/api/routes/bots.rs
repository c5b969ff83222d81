//! Bot management endpoints.
//!
//! Provides HTTP endpoints for:
//! - Creating a bot (POST /api/create-bot)
//! - Stopping a bot (POST /api/stop-bot/:bot_id)
//! - Listing active bots (GET /api/active-bots)

use crate::api::error::{ApiError, ApiResult};
use crate::registry::BotRecord;
use crate::service::{BotService, CreateBotParams};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Request body for the create endpoint. Both snake_case and camelCase
/// field names are accepted.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBotRequest {
    #[serde(default, alias = "meetingUrl")]
    pub meeting_url: Option<String>,
    #[serde(default, alias = "assetId", alias = "gifFilename")]
    pub gif_filename: Option<String>,
    #[serde(default, alias = "botName")]
    pub bot_name: Option<String>,
}

/// Public view of a bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotSummary {
    pub bot_id: String,
    pub bot_name: String,
    pub meeting_url: String,
    pub camera_url: String,
    pub created_at: DateTime<Utc>,
    pub status: String,
}

impl BotSummary {
    fn from_record(record: BotRecord, status: &str) -> Self {
        Self {
            bot_id: record.bot_id,
            bot_name: record.bot_name,
            meeting_url: record.meeting_url,
            camera_url: record.camera_url,
            created_at: record.created_at,
            status: status.to_string(),
        }
    }
}

pub fn router(service: BotService) -> Router {
    Router::new()
        .route("/api/create-bot", post(create_bot))
        .route("/api/stop-bot/:bot_id", post(stop_bot))
        .route("/api/active-bots", get(active_bots))
        .with_state(service)
}

/// POST /api/create-bot - Send a new bot into a meeting.
async fn create_bot(
    State(service): State<BotService>,
    body: Result<Json<CreateBotRequest>, JsonRejection>,
) -> ApiResult<Json<BotSummary>> {
    let Json(req) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let meeting_url = req.meeting_url.unwrap_or_default();
    if meeting_url.trim().is_empty() {
        return Err(ApiError::bad_request("Meeting URL is required"));
    }
    let asset_id = req.gif_filename.unwrap_or_default();
    if asset_id.trim().is_empty() {
        return Err(ApiError::bad_request("GIF selection is required"));
    }

    info!("Create bot request for {} with {}", meeting_url, asset_id);

    let record = service
        .create_bot(CreateBotParams {
            meeting_url,
            asset_id,
            bot_name: req.bot_name,
        })
        .await?;

    Ok(Json(BotSummary::from_record(record, "joining")))
}

/// POST /api/stop-bot/:bot_id - Stop tracking a bot and release its page.
async fn stop_bot(
    State(service): State<BotService>,
    Path(bot_id): Path<String>,
) -> ApiResult<Json<Value>> {
    if service.stop_bot(&bot_id).await {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(ApiError::not_found("Bot not found"))
    }
}

/// GET /api/active-bots - List bots that have not been stopped.
async fn active_bots(State(service): State<BotService>) -> Json<Vec<BotSummary>> {
    let bots = service
        .list_bots()
        .await
        .into_iter()
        .map(|record| BotSummary::from_record(record, "active"))
        .collect();
    Json(bots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_camel_case() {
        let req: CreateBotRequest = serde_json::from_str(
            r#"{"meetingUrl": "https://zoom.us/j/1", "assetId": "robin.gif", "botName": "Robin"}"#,
        )
        .unwrap();
        assert_eq!(req.meeting_url.as_deref(), Some("https://zoom.us/j/1"));
        assert_eq!(req.gif_filename.as_deref(), Some("robin.gif"));
        assert_eq!(req.bot_name.as_deref(), Some("Robin"));
    }

    #[test]
    fn test_request_accepts_snake_case() {
        let req: CreateBotRequest = serde_json::from_str(
            r#"{"meeting_url": "https://meet.google.com/abc", "gif_filename": "wave.gif"}"#,
        )
        .unwrap();
        assert_eq!(req.gif_filename.as_deref(), Some("wave.gif"));
        assert!(req.bot_name.is_none());
    }
}
