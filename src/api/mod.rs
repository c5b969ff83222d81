//! REST API server for botcam.
//!
//! Provides HTTP endpoints for:
//! - Camera pages rendered by meeting bots
//! - Bot creation, listing, and teardown
//! - GIF asset listing
//! - Health checks

pub mod error;
pub mod routes;

use crate::config::ServerConfig;
use crate::service::BotService;
use anyhow::{Context, Result};
use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

pub use routes::bots::{BotSummary, CreateBotRequest};

pub struct ApiServer {
    host: String,
    port: u16,
    service: BotService,
}

impl ApiServer {
    pub fn new(service: BotService, config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            service,
        }
    }

    /// Binds the configured address without serving yet, so callers can
    /// fail before doing anything that depends on the listener.
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = format!("{}:{}", self.host, self.port);
        TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))
    }

    /// Binds and runs until `shutdown` resolves.
    pub async fn start(self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let app = router(self.service.clone());
        let addr = listener.local_addr()?;

        info!("API server listening on http://{}", addr);
        info!("Exposure mode: {}", self.service.exposure_mode());
        info!("Endpoints:");
        info!("  GET  /                       - Service info");
        info!("  GET  /version                - Get version info");
        info!("  GET  /health                 - Liveness probe");
        info!("  GET  /camera/:page_id        - Camera page for a bot");
        info!("  GET  /api/gifs               - List available GIFs");
        info!("  POST /api/create-bot         - Create a bot");
        info!("  POST /api/stop-bot/:bot_id   - Stop a bot");
        info!("  GET  /api/active-bots        - List active bots");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

/// Builds the full application router.
pub fn router(service: BotService) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/version", get(version))
        .route("/health", get(health).with_state(service.clone()))
        .merge(routes::camera::router(service.clone()))
        .merge(routes::gifs::router(service.clone()))
        .merge(routes::bots::router(service))
}

async fn status() -> Json<Value> {
    Json(json!({
        "service": "botcam",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": "botcam"
    }))
}

async fn health(State(service): State<BotService>) -> Json<Value> {
    let stats = service.stats().await;
    Json(json!({
        "status": "healthy",
        "active_bots": stats.active_bots,
        "camera_pages": stats.camera_pages
    }))
}
