//! Harness configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Harness configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory scanned for the fallback placeholder asset.
    /// Override: `SCRY_ASSET_ROOT`
    pub asset_root: PathBuf,

    /// Reachability probe timeout (milliseconds).
    /// Override: `SCRY_PROBE_TIMEOUT_MS`
    pub probe_timeout_ms: u64,

    /// How long error notices stay visible (milliseconds).
    /// Override: `SCRY_NOTICE_DURATION_MS`
    pub notice_duration_ms: u64,

    /// Capacity of the event broadcast channel.
    pub event_channel_capacity: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            probe_timeout_ms: 5000,
            notice_duration_ms: 5000,
            event_channel_capacity: 100,
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SCRY_PROBE_TIMEOUT_MS") {
            if let Ok(timeout) = val.parse() {
                self.probe_timeout_ms = timeout;
            }
        }

        if let Ok(val) = std::env::var("SCRY_NOTICE_DURATION_MS") {
            if let Ok(duration) = val.parse() {
                self.notice_duration_ms = duration;
            }
        }

        // Note: SCRY_ASSET_ROOT is handled by clap via #[arg(env = ...)] in main.rs
    }

    /// Converts to scry-core's config type.
    pub fn to_core_config(&self) -> scry_core::ViewerConfig {
        scry_core::ViewerConfig {
            asset_root: self.asset_root.clone(),
            probe_timeout_ms: self.probe_timeout_ms,
            notice_duration_ms: self.notice_duration_ms,
            event_channel_capacity: self.event_channel_capacity,
        }
    }
}
