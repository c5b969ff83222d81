//! Local listener plus public tunnel, one pair per camera page.

use super::{ExposedResource, Exposure, ExposureStrategy};
use crate::error::{BotError, BotResult};
use async_trait::async_trait;
use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Opens public tunnels to local ports.
#[async_trait]
pub trait TunnelProvider: Send + Sync {
    async fn open(&self, local_port: u16) -> BotResult<Box<dyn Tunnel>>;
}

/// An open tunnel. Dropping it without `close` may leave the remote end up.
#[async_trait]
pub trait Tunnel: Send + Sync {
    fn public_url(&self) -> &str;

    async fn close(self: Box<Self>);
}

pub struct TunneledExposure {
    provider: Arc<dyn TunnelProvider>,
}

impl TunneledExposure {
    pub fn new(provider: Arc<dyn TunnelProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ExposureStrategy for TunneledExposure {
    fn name(&self) -> &'static str {
        "tunnel"
    }

    async fn expose(&self, page_id: &str, html: Arc<str>) -> BotResult<Exposure> {
        let server = LocalPageServer::start(html).await?;
        info!(
            "Serving camera page {} on http://{}",
            page_id,
            server.local_addr()
        );

        match self.provider.open(server.local_addr().port()).await {
            Ok(tunnel) => {
                info!("Tunnel active for page {}: {}", page_id, tunnel.public_url());
                let camera_url = tunnel.public_url().to_string();
                Ok(Exposure::with_resource(
                    camera_url,
                    Box::new(TunneledPage { server, tunnel }),
                ))
            }
            Err(e) => {
                error!("Failed to open tunnel for page {}: {}", page_id, e);
                server.stop().await;
                Err(e)
            }
        }
    }
}

struct TunneledPage {
    server: LocalPageServer,
    tunnel: Box<dyn Tunnel>,
}

#[async_trait]
impl ExposedResource for TunneledPage {
    async fn close(self: Box<Self>) {
        let TunneledPage { server, tunnel } = *self;
        tunnel.close().await;
        server.stop().await;
    }
}

/// HTTP listener on an ephemeral loopback port that answers every GET with
/// one page.
pub struct LocalPageServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl LocalPageServer {
    pub async fn start(html: Arc<str>) -> BotResult<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| BotError::exposure(format!("Failed to bind local listener: {}", e)))?;
        let addr = listener
            .local_addr()
            .map_err(|e| BotError::exposure(format!("Failed to read listener address: {}", e)))?;

        let app = Router::new().fallback(serve_page).with_state(html);
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                warn!("Local camera server on {} failed: {}", addr, e);
            }
        });

        Ok(Self {
            addr,
            shutdown,
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            warn!("Local camera server task ended abnormally: {}", e);
        }
    }
}

async fn serve_page(State(html): State<Arc<str>>) -> impl IntoResponse {
    (
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Html(html.to_string()),
    )
}
