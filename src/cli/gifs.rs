use crate::assets::AssetLoader;
use crate::config::Config;
use anyhow::{Context, Result};

pub fn handle_gifs_command(config: &Config) -> Result<()> {
    let loader = AssetLoader::new(config.assets.dir.clone());
    let gifs = loader.list().context("Failed to list GIFs")?;

    if gifs.is_empty() {
        println!("No GIFs found in {:?}", loader.dir());
        return Ok(());
    }

    println!("Found {} GIF(s) in {:?}:\n", gifs.len(), loader.dir());
    for gif in gifs {
        println!("  • {} ({}, {} bytes)", gif.display_name, gif.filename, gif.size_bytes);
    }

    Ok(())
}
