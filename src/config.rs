use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// The three texture channels of the box scene's material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TexturePaths {
    pub color: PathBuf,
    pub roughness: PathBuf,
    pub normal: PathBuf,
}

impl Default for TexturePaths {
    fn default() -> Self {
        Self {
            color: PathBuf::from("assets/texture/color.jpg"),
            roughness: PathBuf::from("assets/texture/roughness.jpg"),
            normal: PathBuf::from("assets/texture/normal.png"),
        }
    }
}

/// Asset locations for the mountable scenes. Paths are configuration, not
/// protocol; how they resolve on disk is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub texture: TexturePaths,
    pub model: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            texture: TexturePaths::default(),
            model: PathBuf::from("assets/buddha.glb"),
        }
    }
}

impl ViewerConfig {
    /// Read a JSON config file; missing keys fall back to defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config file {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_match_asset_layout() {
        let config = ViewerConfig::default();
        assert_eq!(config.texture.color, PathBuf::from("assets/texture/color.jpg"));
        assert_eq!(config.texture.normal, PathBuf::from("assets/texture/normal.png"));
        assert_eq!(config.model, PathBuf::from("assets/buddha.glb"));
    }

    #[test]
    fn partial_json_keeps_defaults_for_the_rest() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{ "model": "other/scene.glb" }"#).unwrap();
        assert_eq!(config.model, PathBuf::from("other/scene.glb"));
        assert_eq!(config.texture, TexturePaths::default());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ViewerConfig::load(Path::new("no/such/config.json")).unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }
}
