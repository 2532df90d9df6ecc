//! JSON configuration for playback sessions and composition loading.

use crate::clip::ClipSpec;
use crate::error::{LottieError, Result};
use crate::state::INFINITE;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub autoplay: bool,
    pub speed: f32,
    /// `-1` loops forever.
    pub repeat_count: i32,
    pub clip: Option<ClipSpec>,
    pub start_progress: f32,
    pub image_assets_folder: Option<PathBuf>,
    /// Simulated display refresh rate, used by headless drivers.
    pub refresh_rate: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            autoplay: true,
            speed: 1.0,
            repeat_count: INFINITE,
            clip: None,
            start_progress: 0.0,
            image_assets_folder: None,
            refresh_rate: 60.0,
        }
    }
}

impl PlaybackConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| LottieError::io(path, e))?;
        Self::from_json_str(&json)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Root for `CompositionSpec::Asset` names.
    pub assets_dir: PathBuf,
    /// Raw resource table, id to file.
    pub resources: HashMap<u32, PathBuf>,
    /// Reuse parsed compositions for identical sources.
    pub cache: bool,
    pub http_timeout_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            resources: HashMap::new(),
            cache: true,
            http_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = PlaybackConfig::from_json_str(r#"{ "speed": -0.5 }"#).unwrap();
        assert_eq!(config.speed, -0.5);
        assert!(config.autoplay);
        assert_eq!(config.repeat_count, INFINITE);
        assert_eq!(config.refresh_rate, 60.0);
    }

    #[test]
    fn parses_clip_and_folder() {
        let config = PlaybackConfig::from_json_str(
            r#"{
                "autoplay": false,
                "repeat_count": 2,
                "clip": { "kind": "marker", "name": "intro" },
                "image_assets_folder": "images"
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.clip,
            Some(ClipSpec::Marker {
                name: "intro".into()
            })
        );
        assert_eq!(config.image_assets_folder, Some(PathBuf::from("images")));
        assert_eq!(config.repeat_count, 2);
    }

    #[test]
    fn loader_resources_are_keyed_by_id() {
        let config: LoaderConfig =
            serde_json::from_str(r#"{ "resources": { "7": "raw/loading.json" } }"#).unwrap();
        assert_eq!(config.resources[&7], PathBuf::from("raw/loading.json"));
        assert!(config.cache);
    }
}
