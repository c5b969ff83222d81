//! ngrok agent tunnels.
//!
//! Each tunnel is its own `ngrok http <port>` child process. The public URL
//! is read from the agent's JSON log on stdout.

use super::tunneled::{Tunnel, TunnelProvider};
use crate::config::TunnelConfig;
use crate::error::{BotError, BotResult};
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Interesting lines from the agent log.
#[derive(Debug, PartialEq)]
enum AgentEvent {
    Started(String),
    Failed(String),
    Other,
}

pub struct NgrokProvider {
    config: TunnelConfig,
}

impl NgrokProvider {
    pub fn new(config: TunnelConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TunnelProvider for NgrokProvider {
    async fn open(&self, local_port: u16) -> BotResult<Box<dyn Tunnel>> {
        let binary = which::which(&self.config.command).map_err(|_| {
            BotError::exposure(format!(
                "'{}' not found in PATH. Install ngrok and run: ngrok config add-authtoken <TOKEN>",
                self.config.command
            ))
        })?;

        info!("Starting ngrok tunnel on port {}...", local_port);

        let mut command = Command::new(binary);
        command
            .arg("http")
            .arg(local_port.to_string())
            .args(["--log", "stdout", "--log-format", "json"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(token) = &self.config.authtoken {
            command.arg("--authtoken").arg(token);
        }

        let mut child = command
            .spawn()
            .map_err(|e| BotError::exposure(format!("Failed to start ngrok: {}", e)))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BotError::exposure("ngrok stdout unavailable"))?;
        let mut lines = BufReader::new(stdout).lines();

        let timeout = Duration::from_secs(self.config.startup_timeout_seconds);
        let public_url = match tokio::time::timeout(timeout, wait_for_url(&mut lines)).await {
            Ok(Ok(url)) => force_https(&url),
            Ok(Err(e)) => {
                let _ = child.kill().await;
                return Err(e);
            }
            Err(_) => {
                let _ = child.kill().await;
                return Err(BotError::exposure(format!(
                    "ngrok did not report a tunnel within {}s",
                    timeout.as_secs()
                )));
            }
        };

        // The agent blocks once its stdout pipe fills up.
        let drain = tokio::spawn(async move {
            while let Ok(Some(line)) = lines.next_line().await {
                debug!("ngrok: {}", line);
            }
        });

        info!("ngrok tunnel active: {}", public_url);

        Ok(Box::new(NgrokTunnel {
            public_url,
            child,
            drain,
        }))
    }
}

struct NgrokTunnel {
    public_url: String,
    child: Child,
    drain: JoinHandle<()>,
}

#[async_trait]
impl Tunnel for NgrokTunnel {
    fn public_url(&self) -> &str {
        &self.public_url
    }

    async fn close(self: Box<Self>) {
        let NgrokTunnel {
            public_url,
            mut child,
            drain,
        } = *self;
        if let Err(e) = child.kill().await {
            warn!("Failed to stop ngrok for {}: {}", public_url, e);
        }
        drain.abort();
        info!("ngrok tunnel closed: {}", public_url);
    }
}

async fn wait_for_url(lines: &mut Lines<BufReader<ChildStdout>>) -> BotResult<String> {
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| BotError::exposure(format!("Failed to read ngrok output: {}", e)))?
    {
        match parse_agent_line(&line) {
            AgentEvent::Started(url) => return Ok(url),
            AgentEvent::Failed(message) => {
                return Err(BotError::exposure(format!("ngrok failed: {}", message)))
            }
            AgentEvent::Other => debug!("ngrok: {}", line),
        }
    }
    Err(BotError::exposure("ngrok exited before opening a tunnel"))
}

fn parse_agent_line(line: &str) -> AgentEvent {
    let Ok(value) = serde_json::from_str::<Value>(line) else {
        return AgentEvent::Other;
    };

    let field = |name: &str| value.get(name).and_then(Value::as_str);

    if field("msg") == Some("started tunnel") {
        if let Some(url) = field("url") {
            return AgentEvent::Started(url.to_string());
        }
    }

    match field("lvl") {
        Some("eror") | Some("crit") => AgentEvent::Failed(
            field("err")
                .or_else(|| field("msg"))
                .unwrap_or("unknown error")
                .to_string(),
        ),
        _ => AgentEvent::Other,
    }
}

fn force_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}
