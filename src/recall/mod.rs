//! Client for the RecallAI bot provisioning API.

use crate::config::RecallConfig;
use crate::error::{BotError, BotResult};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

/// Rendering profile requested for every supported platform. Output media
/// needs at least the 4-core web variant.
pub const OUTPUT_MEDIA_VARIANT: &str = "web_4_core";

/// What the provisioning API told us about a new bot.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedBot {
    pub id: String,
    pub bot_name: Option<String>,
}

/// Anything that can ask a meeting platform to admit a camera bot.
#[async_trait]
pub trait BotProvisioner: Send + Sync {
    async fn create_bot(
        &self,
        meeting_url: &str,
        camera_url: &str,
        bot_name: &str,
    ) -> BotResult<CreatedBot>;
}

#[derive(Debug, Serialize)]
pub struct CreateBotRequest<'a> {
    pub meeting_url: &'a str,
    pub bot_name: &'a str,
    pub variant: Variant,
    pub output_media: OutputMedia<'a>,
    pub recording_config: RecordingConfig,
}

#[derive(Debug, Serialize)]
pub struct Variant {
    pub zoom: &'static str,
    pub google_meet: &'static str,
    pub microsoft_teams: &'static str,
    pub webex: &'static str,
}

#[derive(Debug, Serialize)]
pub struct OutputMedia<'a> {
    pub camera: CameraOutput<'a>,
}

#[derive(Debug, Serialize)]
pub struct CameraOutput<'a> {
    pub kind: &'static str,
    pub config: CameraOutputConfig<'a>,
}

#[derive(Debug, Serialize)]
pub struct CameraOutputConfig<'a> {
    pub url: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RecordingConfig {
    pub video_mixed_layout: &'static str,
}

impl<'a> CreateBotRequest<'a> {
    pub fn new(meeting_url: &'a str, camera_url: &'a str, bot_name: &'a str) -> Self {
        Self {
            meeting_url,
            bot_name,
            variant: Variant {
                zoom: OUTPUT_MEDIA_VARIANT,
                google_meet: OUTPUT_MEDIA_VARIANT,
                microsoft_teams: OUTPUT_MEDIA_VARIANT,
                webex: OUTPUT_MEDIA_VARIANT,
            },
            output_media: OutputMedia {
                camera: CameraOutput {
                    kind: "webpage",
                    config: CameraOutputConfig { url: camera_url },
                },
            },
            recording_config: RecordingConfig {
                video_mixed_layout: "speaker_view",
            },
        }
    }
}

pub struct RecallClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl RecallClient {
    pub fn new(api_key: String, base_url: impl Into<String>, timeout: Duration) -> BotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Upstream {
                status: None,
                body: format!("Failed to build HTTP client: {}", e),
            })?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        info!("Initialized RecallAI client with base URL: {}", base_url);

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    /// Builds a client from config. Fails when no API key is configured.
    pub fn from_config(config: &RecallConfig) -> BotResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                BotError::input("RecallAI API key is not configured (set RECALL_API_KEY)")
            })?;
        Self::new(
            api_key,
            config.api_base.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl BotProvisioner for RecallClient {
    async fn create_bot(
        &self,
        meeting_url: &str,
        camera_url: &str,
        bot_name: &str,
    ) -> BotResult<CreatedBot> {
        let url = format!("{}/bot", self.base_url);
        let request_body = CreateBotRequest::new(meeting_url, camera_url, bot_name);

        info!("Creating bot '{}' for meeting: {}", bot_name, meeting_url);
        debug!("Camera URL: {}", camera_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Accept", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!("RecallAI request failed: {}", e);
                BotError::Upstream {
                    status: None,
                    body: e.to_string(),
                }
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| BotError::Upstream {
            status: Some(status.as_u16()),
            body: format!("Failed to read response body: {}", e),
        })?;

        if status.as_u16() >= 400 {
            error!(
                "RecallAI bot creation failed with status {}: {}",
                status, response_text
            );
            return Err(BotError::Upstream {
                status: Some(status.as_u16()),
                body: response_text,
            });
        }

        let created = parse_created_bot(&response_text)?;
        info!("Bot created: {}", created.id);
        Ok(created)
    }
}

fn parse_created_bot(body: &str) -> BotResult<CreatedBot> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| BotError::MalformedResponse(format!("invalid JSON ({}): {}", e, body)))?;

    let id = value
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| BotError::MalformedResponse(format!("missing bot id: {}", body)))?;

    Ok(CreatedBot {
        id: id.to_string(),
        bot_name: value
            .get("bot_name")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = CreateBotRequest::new(
            "https://zoom.us/j/123",
            "https://cam.example.com/camera/abc",
            "Agent",
        );
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({
                "meeting_url": "https://zoom.us/j/123",
                "bot_name": "Agent",
                "variant": {
                    "zoom": "web_4_core",
                    "google_meet": "web_4_core",
                    "microsoft_teams": "web_4_core",
                    "webex": "web_4_core"
                },
                "output_media": {
                    "camera": {
                        "kind": "webpage",
                        "config": { "url": "https://cam.example.com/camera/abc" }
                    }
                },
                "recording_config": { "video_mixed_layout": "speaker_view" }
            })
        );
    }

    #[test]
    fn test_parse_created_bot() {
        let bot = parse_created_bot(r#"{"id": "bot_abc", "bot_name": "Agent"}"#).unwrap();
        assert_eq!(bot.id, "bot_abc");
        assert_eq!(bot.bot_name.as_deref(), Some("Agent"));
    }

    #[test]
    fn test_parse_missing_id() {
        assert!(matches!(
            parse_created_bot(r#"{"bot_name": "Agent"}"#),
            Err(BotError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_created_bot(r#"{"id": 42}"#),
            Err(BotError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_not_json() {
        assert!(matches!(
            parse_created_bot("<html>bad gateway</html>"),
            Err(BotError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = RecallConfig::default();
        assert!(matches!(
            RecallClient::from_config(&config),
            Err(BotError::Input(_))
        ));

        let config = RecallConfig {
            api_key: Some("key".to_string()),
            api_base: "https://api.example.com/v1/".to_string(),
            ..RecallConfig::default()
        };
        let client = RecallClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "https://api.example.com/v1");
    }
}
