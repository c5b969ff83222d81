use crate::api::ApiServer;
use crate::assets;
use crate::cli::LaunchCliArgs;
use crate::config::{Config, ExposureConfig};
use crate::service::BotService;
use anyhow::{Context, Result};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

pub async fn run_service(config: Config) -> Result<()> {
    info!("Starting botcam service");

    let service = BotService::from_config(&config);
    log_assets(&service);

    warn_if_unreachable(&config);

    let server = ApiServer::new(service.clone(), &config.server);
    server.start(shutdown_signal()).await?;

    let stopped = service.stop_all().await;
    if stopped > 0 {
        info!("Released {} bot(s) on shutdown", stopped);
    }

    Ok(())
}

/// Exposes one GIF, sends one bot, and keeps the page up until Ctrl-C.
pub async fn run_launch(config: Config, args: LaunchCliArgs) -> Result<()> {
    let gif = assets::load_file(&args.gif)
        .with_context(|| format!("Failed to load GIF {:?}", args.gif))?;
    let label = args
        .gif
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| args.gif.display().to_string());
    info!("Loaded GIF: {} ({} bytes)", label, gif.len());

    let service = BotService::from_config(&config);

    // Hosted pages are served by our own camera route, so the listener has
    // to be up before any bot is told to load it.
    let (server_shutdown, server_shutdown_rx) = oneshot::channel::<()>();
    let server = match config.exposure {
        ExposureConfig::Hosted { .. } => {
            warn_if_unreachable(&config);
            let server = ApiServer::new(service.clone(), &config.server);
            let listener = server
                .bind()
                .await
                .context("Camera server could not start; no bot was created")?;
            Some(tokio::spawn(server.serve(listener, async {
                let _ = server_shutdown_rx.await;
            })))
        }
        ExposureConfig::Tunnel(_) => None,
    };

    let result = service
        .create_bot_with_gif(&args.meeting_url, &label, &gif, args.bot_name.as_deref())
        .await;

    match &result {
        Ok(record) => {
            println!();
            println!("Your bot is joining the meeting!");
            println!("  Bot ID:     {}", record.bot_id);
            println!("  Bot Name:   {}", record.bot_name);
            println!("  Camera URL: {}", record.camera_url);
            println!();
            println!("Keep this process running while the bot is in the meeting.");
            println!("Press Ctrl+C to stop serving the camera page and exit.");

            shutdown_signal().await;
            service.stop_all().await;
        }
        Err(e) => error!("Failed to create bot: {}", e),
    }

    let _ = server_shutdown.send(());
    if let Some(server) = server {
        match server.await {
            Ok(Err(e)) => error!("API server failed: {}", e),
            Err(e) => error!("API server task failed: {}", e),
            Ok(Ok(())) => {}
        }
    }

    result.map(|_| ()).map_err(Into::into)
}

fn warn_if_unreachable(config: &Config) {
    if let Some(url) = config.unreachable_base_url() {
        warn!(
            "No public base URL configured; camera pages will use {} which meeting bots cannot reach",
            url
        );
    } else if let ExposureConfig::Hosted { .. } = config.exposure {
        info!("Base URL: {}", config.public_base_url());
    }
}

fn log_assets(service: &BotService) {
    match service.list_assets() {
        Ok(gifs) => {
            info!("Found {} GIFs in {:?}", gifs.len(), service.assets().dir());
            for gif in gifs {
                info!("  • {} ({})", gif.display_name, gif.filename);
            }
        }
        Err(e) => warn!("Failed to list GIFs: {}", e),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
    }
    info!("Shutting down...");
}
