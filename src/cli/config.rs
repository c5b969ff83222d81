use crate::config::Config;
use anyhow::{Context, Result};

pub fn handle_config_command(config: &Config) -> Result<()> {
    let rendered =
        toml::to_string_pretty(&config.redacted()).context("Failed to serialize config")?;
    println!("{}", rendered.trim_end());

    if config.recall.api_key.is_none() {
        eprintln!("\nWarning: no RecallAI API key configured. Set RECALL_API_KEY to create bots.");
    }

    Ok(())
}
