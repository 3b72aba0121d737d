//! Configuration for the Scry viewer core.
//!
//! [`ViewerConfig`] groups the tunables of the connection machinery. The
//! harness binary builds one from its own config file and CLI overrides.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the stream viewer core.
///
/// All fields have sensible defaults.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ViewerConfig {
    /// Read-only directory scanned for the fallback placeholder asset.
    pub asset_root: PathBuf,

    /// Request timeout for the reachability probe (milliseconds).
    pub probe_timeout_ms: u64,

    /// How long an error notice stays visible before auto-dismissal (milliseconds).
    pub notice_duration_ms: u64,

    /// Capacity of the event broadcast channel.
    pub event_channel_capacity: usize,
}

impl ViewerConfig {
    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.probe_timeout_ms == 0 {
            return Err("probe_timeout_ms must be >= 1".to_string());
        }
        if self.notice_duration_ms == 0 {
            return Err("notice_duration_ms must be >= 1".to_string());
        }
        if self.event_channel_capacity == 0 {
            return Err(
                "event_channel_capacity must be >= 1 (broadcast::channel panics on 0)".to_string(),
            );
        }
        Ok(())
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            probe_timeout_ms: 5000,
            notice_duration_ms: 5000,
            event_channel_capacity: 100,
        }
    }
}
