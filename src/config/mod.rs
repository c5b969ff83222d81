use crate::global;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_API_BASE: &str = "https://us-west-2.recall.ai/api/v1";
pub const DEFAULT_BOT_NAME: &str = "Clarity's Security Agent";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub recall: RecallConfig,
    pub bot: BotConfig,
    pub server: ServerConfig,
    pub assets: AssetsConfig,
    pub exposure: ExposureConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    /// Never embedded; comes from the config file or RECALL_API_KEY.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub api_base: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub default_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub dir: PathBuf,
}

/// How camera pages are made reachable by the provisioning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ExposureConfig {
    /// This process is publicly routable. Without a base URL the local
    /// server address is used, which only suits development.
    Hosted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        public_base_url: Option<String>,
    },
    /// Each page gets its own local listener behind an ngrok tunnel.
    Tunnel(TunnelConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelConfig {
    /// Agent binary name or path.
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authtoken: Option<String>,
    pub startup_timeout_seconds: u64,
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            default_name: DEFAULT_BOT_NAME.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets/gifs"),
        }
    }
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self::Hosted {
            public_base_url: None,
        }
    }
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            command: "ngrok".to_string(),
            authtoken: None,
            startup_timeout_seconds: 15,
        }
    }
}

impl Config {
    /// Loads the config file and applies environment overrides.
    ///
    /// With no explicit path the default location is used and created with
    /// defaults when missing. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => {
                let config_path = global::config_file()?;
                if config_path.exists() {
                    Self::read(&config_path)?
                } else {
                    info!(
                        "Config file not found, creating default at {:?}",
                        config_path
                    );
                    let config = Self::default();
                    config.save(&config_path)?;
                    config
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Applies environment-style overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = lookup("RECALL_API_KEY") {
            self.recall.api_key = Some(key);
        }
        if let Some(base) = lookup("RECALL_API_BASE") {
            self.recall.api_base = base;
        }
        if let Some(name) = lookup("BOT_NAME") {
            self.bot.default_name = name;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(dir) = lookup("ASSETS_DIR") {
            self.assets.dir = PathBuf::from(dir);
        }

        match lookup("EXPOSURE").as_deref() {
            Some("tunnel") => {
                if !matches!(self.exposure, ExposureConfig::Tunnel(_)) {
                    self.exposure = ExposureConfig::Tunnel(TunnelConfig::default());
                }
            }
            Some("hosted") => {
                if !matches!(self.exposure, ExposureConfig::Hosted { .. }) {
                    self.exposure = ExposureConfig::default();
                }
            }
            _ => {}
        }

        // Platform-provided domains win over an explicit BASE_URL.
        let base_url = lookup("RAILWAY_PUBLIC_DOMAIN")
            .map(|domain| format!("https://{}", domain))
            .or_else(|| lookup("RENDER_EXTERNAL_URL"))
            .or_else(|| lookup("FLY_APP_NAME").map(|app| format!("https://{}.fly.dev", app)))
            .or_else(|| lookup("BASE_URL"));
        if let Some(base_url) = base_url {
            if let ExposureConfig::Hosted { public_base_url } = &mut self.exposure {
                *public_base_url = Some(base_url);
            }
        }
        if let Some(token) = lookup("NGROK_AUTHTOKEN") {
            if let ExposureConfig::Tunnel(tunnel) = &mut self.exposure {
                tunnel.authtoken = Some(token);
            }
        }
    }

    /// Base URL that camera routes are published under in hosted mode.
    pub fn public_base_url(&self) -> String {
        match &self.exposure {
            ExposureConfig::Hosted {
                public_base_url: Some(url),
            } => url.trim_end_matches('/').to_string(),
            _ => format!("http://localhost:{}", self.server.port),
        }
    }

    /// The localhost fallback URL when hosted mode has no public base URL.
    pub fn unreachable_base_url(&self) -> Option<String> {
        match &self.exposure {
            ExposureConfig::Hosted {
                public_base_url: None,
            } => Some(self.public_base_url()),
            _ => None,
        }
    }

    /// Copy safe to print: credentials are masked.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.recall.api_key.is_some() {
            config.recall.api_key = Some("********".to_string());
        }
        if let ExposureConfig::Tunnel(tunnel) = &mut config.exposure {
            if tunnel.authtoken.is_some() {
                tunnel.authtoken = Some("********".to_string());
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_have_no_api_key() {
        let config = Config::default();
        assert!(config.recall.api_key.is_none());
        assert_eq!(config.recall.api_base, DEFAULT_API_BASE);
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.exposure, ExposureConfig::default());
    }

    #[test]
    fn test_parse_tunnel_mode() {
        let config: Config = toml::from_str(
            r#"
            [recall]
            api_key = "secret"

            [exposure]
            mode = "tunnel"
            startup_timeout_seconds = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.recall.api_key.as_deref(), Some("secret"));
        match config.exposure {
            ExposureConfig::Tunnel(tunnel) => {
                assert_eq!(tunnel.command, "ngrok");
                assert_eq!(tunnel.startup_timeout_seconds, 30);
            }
            other => panic!("expected tunnel mode, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_hosted_mode() {
        let config: Config = toml::from_str(
            r#"
            [exposure]
            mode = "hosted"
            public_base_url = "https://bots.example.com/"
            "#,
        )
        .unwrap();

        assert_eq!(config.public_base_url(), "https://bots.example.com");
    }

    #[test]
    fn test_public_base_url_falls_back_to_port() {
        let mut config = Config::default();
        config.server.port = 8080;
        assert_eq!(config.public_base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("RECALL_API_KEY", "abc"),
            ("PORT", "9000"),
            ("BASE_URL", "https://cam.example.com"),
            ("ASSETS_DIR", "/srv/gifs"),
        ]));

        assert_eq!(config.recall.api_key.as_deref(), Some("abc"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.public_base_url(), "https://cam.example.com");
        assert_eq!(config.assets.dir, PathBuf::from("/srv/gifs"));
    }

    #[test]
    fn test_platform_domain_detection() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("RAILWAY_PUBLIC_DOMAIN", "botcam.up.railway.app"),
            ("FLY_APP_NAME", "botcam"),
            ("BASE_URL", "https://cam.example.com"),
        ]));
        assert_eq!(config.public_base_url(), "https://botcam.up.railway.app");

        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("RENDER_EXTERNAL_URL", "https://botcam.onrender.com"),
            ("FLY_APP_NAME", "botcam"),
        ]));
        assert_eq!(config.public_base_url(), "https://botcam.onrender.com");

        let mut config = Config::default();
        config.apply_overrides(env(&[("FLY_APP_NAME", "botcam"), ("BASE_URL", "https://x.example")]));
        assert_eq!(config.public_base_url(), "https://botcam.fly.dev");

        let mut config = Config::default();
        config.apply_overrides(env(&[("EXPOSURE", "tunnel"), ("FLY_APP_NAME", "botcam")]));
        assert!(matches!(config.exposure, ExposureConfig::Tunnel(_)));
    }

    #[test]
    fn test_unreachable_base_url() {
        let mut config = Config::default();
        config.server.port = 5050;
        assert_eq!(
            config.unreachable_base_url().as_deref(),
            Some("http://localhost:5050")
        );

        config.apply_overrides(env(&[("BASE_URL", "https://cam.example.com")]));
        assert!(config.unreachable_base_url().is_none());

        config.exposure = ExposureConfig::Tunnel(TunnelConfig::default());
        assert!(config.unreachable_base_url().is_none());
    }

    #[test]
    fn test_env_selects_tunnel() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("EXPOSURE", "tunnel"), ("NGROK_AUTHTOKEN", "tok")]));

        match &config.exposure {
            ExposureConfig::Tunnel(tunnel) => assert_eq!(tunnel.authtoken.as_deref(), Some("tok")),
            other => panic!("expected tunnel mode, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(env(&[("RECALL_API_KEY", "  "), ("PORT", "nope")]));
        assert!(config.recall.api_key.is_none());
        assert_eq!(config.server.port, 5001);
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let mut config = Config::default();
        config.recall.api_key = Some("real-key".to_string());
        let shown = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!shown.contains("real-key"));
        assert!(shown.contains("********"));
    }

    #[test]
    fn test_save_and_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.bot.default_name = "Robin".to_string();
        config.exposure = ExposureConfig::Tunnel(TunnelConfig::default());
        config.save(&path).unwrap();

        let loaded = Config::read(&path).unwrap();
        assert_eq!(loaded.bot.default_name, "Robin");
        assert!(matches!(loaded.exposure, ExposureConfig::Tunnel(_)));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
