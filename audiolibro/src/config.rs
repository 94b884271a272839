//! audiolibro configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::jobs::{BackoffPolicy, MIN_NARRATABLE_CHARS};
use crate::voices::DEFAULT_VOICE;

const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Voice preset key or full voice id
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Where chapter audio is written. None means ./output
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Narration provider name. None means the tts-client default
    #[serde(default)]
    pub provider: Option<String>,

    /// Chapters converted between rate-limit pauses
    #[serde(default = "default_pause_every")]
    pub pause_every: usize,

    /// Length of each rate-limit pause
    #[serde(default = "default_pause_seconds")]
    pub pause_seconds: u64,

    /// Chapters shorter than this (after sanitizing) are skipped
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_pause_every() -> usize {
    BackoffPolicy::default().every
}

fn default_pause_seconds() -> u64 {
    BackoffPolicy::default().pause_seconds
}

fn default_min_chars() -> usize {
    MIN_NARRATABLE_CHARS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            output_dir: None,
            provider: None,
            pause_every: default_pause_every(),
            pause_seconds: default_pause_seconds(),
            min_chars: default_min_chars(),
        }
    }
}

impl AppConfig {
    /// Get the config file path: <config dir>/cli-programs/audiolibro.toml
    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(dir.join("cli-programs").join("audiolibro.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Output directory, falling back to ./output
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            every: self.pause_every,
            pause_seconds: self.pause_seconds,
        }
    }
}
