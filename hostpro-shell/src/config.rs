//! Settings file
//!
//! Loaded from `--config`, else `<config dir>/ai-host-pro/config.toml`. A
//! missing file means defaults; every key is optional.

use anyhow::{Context, Result};
use hostpro_bridge::GenAiConfig;
use hostpro_event::store::default_data_dir;
use hostpro_event::SequencerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub genai: GenAiConfig,

    #[serde(default)]
    pub playback: PlaybackSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackSettings {
    /// Pause between segments
    #[serde(default = "default_advance_delay_ms")]
    pub advance_delay_ms: u64,

    /// Move on when a segment cannot be voiced
    #[serde(default = "default_true")]
    pub advance_after_unvoiced: bool,

    /// Never open an audio device
    #[serde(default)]
    pub mute: bool,
}

fn default_advance_delay_ms() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            advance_delay_ms: default_advance_delay_ms(),
            advance_after_unvoiced: true,
            mute: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageSettings {
    pub fn resolved_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

impl Settings {
    /// Default settings file location
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("ai-host-pro");
        path.push("config.toml");
        Some(path)
    }

    /// Load from `path`, or the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig {
            advance_delay: Duration::from_millis(self.playback.advance_delay_ms),
            advance_after_unvoiced: self.playback.advance_after_unvoiced,
        }
    }
}
