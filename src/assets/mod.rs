//! GIF asset discovery and loading.

use crate::error::{BotError, BotResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A GIF available for use as a bot camera feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifAsset {
    pub filename: String,
    pub display_name: String,
    pub size_bytes: u64,
}

/// Reads GIFs out of a single flat directory.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    dir: PathBuf,
}

impl AssetLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lists `*.gif` files sorted by filename. A missing directory yields
    /// an empty list.
    pub fn list(&self) -> BotResult<Vec<GifAsset>> {
        if !self.dir.exists() {
            warn!("Asset directory {:?} does not exist", self.dir);
            return Ok(Vec::new());
        }

        let mut assets = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !is_gif(&path) {
                continue;
            }
            let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            assets.push(GifAsset {
                filename: filename.to_string(),
                display_name: display_name(&path),
                size_bytes: entry.metadata()?.len(),
            });
        }

        assets.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(assets)
    }

    /// Loads the raw bytes of the asset named `asset_id`.
    pub fn load(&self, asset_id: &str) -> BotResult<Vec<u8>> {
        let path = self.resolve(asset_id)?;
        let bytes = std::fs::read(&path)?;
        debug!("Loaded GIF {} ({} bytes)", asset_id, bytes.len());
        Ok(bytes)
    }

    fn resolve(&self, asset_id: &str) -> BotResult<PathBuf> {
        let candidate = Path::new(asset_id);
        let is_plain_name = candidate.file_name().and_then(|n| n.to_str()) == Some(asset_id);
        if asset_id.is_empty() || !is_plain_name {
            return Err(BotError::input(format!("Invalid GIF name: {}", asset_id)));
        }

        let path = self.dir.join(candidate);
        if !path.is_file() {
            return Err(BotError::AssetNotFound(asset_id.to_string()));
        }
        Ok(path)
    }
}

/// Loads a GIF from an arbitrary path, as given on the command line.
pub fn load_file(path: &Path) -> BotResult<Vec<u8>> {
    if !path.is_file() {
        return Err(BotError::AssetNotFound(path.display().to_string()));
    }
    Ok(std::fs::read(path)?)
}

fn is_gif(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gif"))
}

/// `robin_hood-dance.gif` -> `Robin Hood Dance`
fn display_name(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    stem.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader_with(files: &[(&str, &[u8])]) -> (tempfile::TempDir, AssetLoader) {
        let dir = tempfile::tempdir().unwrap();
        for (name, data) in files {
            std::fs::write(dir.path().join(name), data).unwrap();
        }
        let loader = AssetLoader::new(dir.path());
        (dir, loader)
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("robin_hood-dance.gif")), "Robin Hood Dance");
        assert_eq!(display_name(Path::new("WAVE.gif")), "Wave");
    }

    #[test]
    fn test_list_only_gifs_sorted() {
        let (_dir, loader) = loader_with(&[
            ("zeta.gif", b"GIF89a"),
            ("alpha.GIF", b"GIF89a12"),
            ("notes.txt", b"hello"),
        ]);

        let assets = loader.list().unwrap();
        let names: Vec<_> = assets.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["alpha.GIF", "zeta.gif"]);
        assert_eq!(assets[0].size_bytes, 8);
        assert_eq!(assets[1].display_name, "Zeta");
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let loader = AssetLoader::new("/definitely/not/here");
        assert!(loader.list().unwrap().is_empty());
    }

    #[test]
    fn test_load_bytes() {
        let (_dir, loader) = loader_with(&[("robin.gif", b"GIF89a-data")]);
        assert_eq!(loader.load("robin.gif").unwrap(), b"GIF89a-data");
    }

    #[test]
    fn test_load_unknown_asset() {
        let (_dir, loader) = loader_with(&[]);
        assert!(matches!(
            loader.load("missing.gif"),
            Err(BotError::AssetNotFound(_))
        ));
    }

    #[test]
    fn test_load_rejects_traversal() {
        let (_dir, loader) = loader_with(&[]);
        assert!(matches!(loader.load("../secret.gif"), Err(BotError::Input(_))));
        assert!(matches!(loader.load("/etc/passwd"), Err(BotError::Input(_))));
        assert!(matches!(loader.load(""), Err(BotError::Input(_))));
    }
}
