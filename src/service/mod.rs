//! Bot lifecycle: render a camera page, expose it, provision the bot, and
//! undo all of it when the bot stops or creation fails.

use crate::assets::{AssetLoader, GifAsset};
use crate::camera;
use crate::config::Config;
use crate::error::{BotError, BotResult};
use crate::exposure::{self, Exposure, ExposureStrategy};
use crate::recall::{BotProvisioner, RecallClient};
use crate::registry::{BotRecord, BotRegistry, PageRegistry};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Parameters for a new bot.
#[derive(Debug, Clone, Default)]
pub struct CreateBotParams {
    pub meeting_url: String,
    pub asset_id: String,
    pub bot_name: Option<String>,
}

/// Registry sizes, for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceStats {
    pub active_bots: usize,
    pub camera_pages: usize,
}

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct BotService {
    assets: AssetLoader,
    pages: PageRegistry,
    bots: BotRegistry,
    exposures: Arc<Mutex<HashMap<String, Exposure>>>,
    exposure: Arc<dyn ExposureStrategy>,
    provisioner: Option<Arc<dyn BotProvisioner>>,
    default_bot_name: String,
}

impl BotService {
    pub fn new(
        assets: AssetLoader,
        exposure: Arc<dyn ExposureStrategy>,
        provisioner: Option<Arc<dyn BotProvisioner>>,
        default_bot_name: impl Into<String>,
    ) -> Self {
        Self {
            assets,
            pages: PageRegistry::new(),
            bots: BotRegistry::new(),
            exposures: Arc::new(Mutex::new(HashMap::new())),
            exposure,
            provisioner,
            default_bot_name: default_bot_name.into(),
        }
    }

    /// Wires up the service from config. A missing API key is not fatal
    /// here; bot creation reports it instead.
    pub fn from_config(config: &Config) -> Self {
        let provisioner = match RecallClient::from_config(&config.recall) {
            Ok(client) => Some(Arc::new(client) as Arc<dyn BotProvisioner>),
            Err(e) => {
                warn!("Bot creation disabled: {}", e);
                None
            }
        };

        Self::new(
            AssetLoader::new(config.assets.dir.clone()),
            exposure::from_config(config),
            provisioner,
            config.bot.default_name.clone(),
        )
    }

    pub fn assets(&self) -> &AssetLoader {
        &self.assets
    }

    pub fn pages(&self) -> &PageRegistry {
        &self.pages
    }

    pub fn exposure_mode(&self) -> &'static str {
        self.exposure.name()
    }

    pub fn list_assets(&self) -> BotResult<Vec<GifAsset>> {
        self.assets.list()
    }

    /// Creates a bot using a GIF from the asset directory.
    pub async fn create_bot(&self, params: CreateBotParams) -> BotResult<BotRecord> {
        let meeting_url = params.meeting_url.trim();
        let asset_id = params.asset_id.trim();
        if meeting_url.is_empty() {
            return Err(BotError::input("Meeting URL is required"));
        }
        if asset_id.is_empty() {
            return Err(BotError::input("GIF selection is required"));
        }
        self.provisioner()?;

        let gif = self.assets.load(asset_id)?;
        self.create_bot_with_gif(meeting_url, asset_id, &gif, params.bot_name.as_deref())
            .await
    }

    /// Creates a bot whose camera shows `gif`. On any failure the camera
    /// page and exposure are released before returning.
    pub async fn create_bot_with_gif(
        &self,
        meeting_url: &str,
        asset_id: &str,
        gif: &[u8],
        bot_name: Option<&str>,
    ) -> BotResult<BotRecord> {
        let meeting_url = meeting_url.trim();
        if meeting_url.is_empty() {
            return Err(BotError::input("Meeting URL is required"));
        }
        let provisioner = self.provisioner()?;
        let bot_name = bot_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.default_bot_name)
            .to_string();

        let html: Arc<str> = camera::render_page(gif).into();
        let page_id = self.pages.register(html.clone()).await;

        let exposed = match self.exposure.expose(&page_id, html).await {
            Ok(exposed) => exposed,
            Err(e) => {
                self.pages.remove(&page_id).await;
                return Err(e);
            }
        };
        info!("Creating bot with camera URL: {}", exposed.camera_url);

        let created = match provisioner
            .create_bot(meeting_url, &exposed.camera_url, &bot_name)
            .await
        {
            Ok(created) => created,
            Err(e) => {
                warn!("Bot creation failed, releasing page {}: {}", page_id, e);
                self.exposure.teardown(exposed).await;
                self.pages.remove(&page_id).await;
                return Err(e);
            }
        };

        let record = BotRecord {
            bot_id: created.id,
            bot_name,
            meeting_url: meeting_url.to_string(),
            camera_url: exposed.camera_url.clone(),
            page_id,
            asset_id: asset_id.to_string(),
            created_at: Utc::now(),
        };

        // Lock order: exposures, then bots (same in stop_bot).
        let (replaced_exposure, previous) = {
            let mut exposures = self.exposures.lock().await;
            let replaced = exposures.insert(record.bot_id.clone(), exposed);
            let previous = self.bots.insert(record.clone()).await;
            (replaced, previous)
        };
        if let Some(previous) = previous {
            warn!(
                "Bot id {} was reused; releasing its previous camera page",
                previous.bot_id
            );
            self.pages.remove(&previous.page_id).await;
        }
        if let Some(old) = replaced_exposure {
            self.exposure.teardown(old).await;
        }

        info!("Bot {} ({}) is joining {}", record.bot_id, record.bot_name, record.meeting_url);
        Ok(record)
    }

    /// Stops tracking a bot and releases its camera page and exposure.
    /// Returns false when the bot is unknown.
    pub async fn stop_bot(&self, bot_id: &str) -> bool {
        let (record, exposed) = {
            let mut exposures = self.exposures.lock().await;
            let Some(record) = self.bots.remove(bot_id).await else {
                return false;
            };
            (record, exposures.remove(bot_id))
        };

        if let Some(exposed) = exposed {
            self.exposure.teardown(exposed).await;
        }
        self.pages.remove(&record.page_id).await;

        info!("Stopped bot {}", bot_id);
        true
    }

    /// Stops every bot. Used on shutdown.
    pub async fn stop_all(&self) -> usize {
        let mut stopped = 0;
        for record in self.bots.list().await {
            if self.stop_bot(&record.bot_id).await {
                stopped += 1;
            }
        }
        stopped
    }

    pub async fn list_bots(&self) -> Vec<BotRecord> {
        self.bots.list().await
    }

    pub async fn get_bot(&self, bot_id: &str) -> Option<BotRecord> {
        self.bots.get(bot_id).await
    }

    pub async fn camera_page(&self, page_id: &str) -> BotResult<Arc<str>> {
        self.pages
            .resolve(page_id)
            .await
            .ok_or_else(|| BotError::NotFound(format!("Camera page {}", page_id)))
    }

    pub async fn stats(&self) -> ServiceStats {
        ServiceStats {
            active_bots: self.bots.len().await,
            camera_pages: self.pages.len().await,
        }
    }

    fn provisioner(&self) -> BotResult<Arc<dyn BotProvisioner>> {
        self.provisioner.clone().ok_or_else(|| {
            BotError::input("RecallAI API key is not configured (set RECALL_API_KEY)")
        })
    }
}
