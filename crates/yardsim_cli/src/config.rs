//! Yardsim configuration file handling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use yardsim_replay::PlaybackConfig;

/// Top-level configuration (yardsim.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct YardsimConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Where scenarios are looked up besides the built-ins
#[derive(Debug, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Directory searched for `<id>.json` before the built-ins
    #[serde(default = "default_scenario_dir")]
    pub scenario_dir: String,
}

fn default_scenario_dir() -> String {
    "scenarios".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            scenario_dir: default_scenario_dir(),
        }
    }
}

impl YardsimConfig {
    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
