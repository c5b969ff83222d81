//! Strategies for making camera pages reachable by the provisioning service.
//!
//! - [`HostedExposure`]: this process is already public; pages are served
//!   from its own `/camera/:page_id` route.
//! - [`TunneledExposure`]: each page gets a dedicated local listener behind
//!   a tunnel.

pub mod ngrok;
pub mod tunneled;

use crate::config::{Config, ExposureConfig};
use crate::error::BotResult;
use async_trait::async_trait;
use std::sync::Arc;

pub use ngrok::NgrokProvider;
pub use tunneled::{Tunnel, TunnelProvider, TunneledExposure};

/// Something that must be released when its bot stops.
#[async_trait]
pub trait ExposedResource: Send + Sync {
    async fn close(self: Box<Self>);
}

/// A public URL for one camera page plus whatever keeps it reachable.
pub struct Exposure {
    pub camera_url: String,
    resource: Option<Box<dyn ExposedResource>>,
}

impl Exposure {
    pub fn new(camera_url: impl Into<String>) -> Self {
        Self {
            camera_url: camera_url.into(),
            resource: None,
        }
    }

    pub fn with_resource(camera_url: impl Into<String>, resource: Box<dyn ExposedResource>) -> Self {
        Self {
            camera_url: camera_url.into(),
            resource: Some(resource),
        }
    }

    /// Releases the resource keeping the URL reachable, if any.
    pub async fn close(self) {
        if let Some(resource) = self.resource {
            resource.close().await;
        }
    }
}

impl std::fmt::Debug for Exposure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exposure")
            .field("camera_url", &self.camera_url)
            .field("has_resource", &self.resource.is_some())
            .finish()
    }
}

#[async_trait]
pub trait ExposureStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Makes `html` publicly reachable. The page is already registered
    /// under `page_id`.
    async fn expose(&self, page_id: &str, html: Arc<str>) -> BotResult<Exposure>;

    async fn teardown(&self, exposure: Exposure) {
        exposure.close().await;
    }
}

/// Camera URLs point back at this process.
pub struct HostedExposure {
    base_url: String,
}

impl HostedExposure {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn camera_url(&self, page_id: &str) -> String {
        format!("{}/camera/{}", self.base_url, page_id)
    }
}

#[async_trait]
impl ExposureStrategy for HostedExposure {
    fn name(&self) -> &'static str {
        "hosted"
    }

    async fn expose(&self, page_id: &str, _html: Arc<str>) -> BotResult<Exposure> {
        Ok(Exposure::new(self.camera_url(page_id)))
    }
}

/// Builds the strategy selected in config.
pub fn from_config(config: &Config) -> Arc<dyn ExposureStrategy> {
    match &config.exposure {
        ExposureConfig::Hosted { .. } => Arc::new(HostedExposure::new(config.public_base_url())),
        ExposureConfig::Tunnel(tunnel) => Arc::new(TunneledExposure::new(Arc::new(
            NgrokProvider::new(tunnel.clone()),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hosted_camera_url() {
        let hosted = HostedExposure::new("https://bots.example.com/");
        let exposure = hosted.expose("abc123", Arc::from("<html/>")).await.unwrap();
        assert_eq!(exposure.camera_url, "https://bots.example.com/camera/abc123");
        hosted.teardown(exposure).await;
    }

    #[test]
    fn test_from_config_selects_strategy() {
        let config = Config::default();
        assert_eq!(from_config(&config).name(), "hosted");

        let mut config = Config::default();
        config.exposure = ExposureConfig::Tunnel(Default::default());
        assert_eq!(from_config(&config).name(), "tunnel");
    }
}
