//! Scry Viewer - headless harness for the stream connection manager.
//!
//! This binary wires the connection machine to a real HTTP probe and a
//! logging playback surface, without any rendering. It performs one connect
//! attempt if a URL is given, logs playback targets and events as they
//! change, and keeps the machine alive until Ctrl+C so probes, notices and
//! dismiss timers behave as they would under a real shell.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use scry_core::{
    BroadcastEventBridge, ConnectOutcome, ConnectionManager, HttpProbe, LoggingSurface,
};
use tokio::signal;

use crate::config::HarnessConfig;

/// Scry Viewer - headless network stream viewer with placeholder fallback.
#[derive(Parser, Debug)]
#[command(name = "scry-viewer")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "SCRY_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Stream URL to connect to on startup.
    #[arg(short, long, env = "SCRY_STREAM_URL")]
    url: Option<String>,

    /// Asset directory for the fallback placeholder (overrides config file).
    #[arg(short, long, env = "SCRY_ASSET_ROOT")]
    asset_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Scry Viewer v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        HarnessConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(asset_root) = args.asset_root {
        config.asset_root = asset_root;
    }

    let core_config = config.to_core_config();
    core_config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;

    log::info!(
        "Configuration: asset_root={}, probe_timeout_ms={}, notice_duration_ms={}",
        core_config.asset_root.display(),
        core_config.probe_timeout_ms,
        core_config.notice_duration_ms,
    );

    let probe = HttpProbe::new(Duration::from_millis(core_config.probe_timeout_ms))
        .context("Failed to build HTTP client for the probe")?;

    // Bridge events onto a broadcast channel and log them as JSON lines,
    // standing in for the toast / status surfaces of a real shell.
    let bridge = BroadcastEventBridge::new(core_config.event_channel_capacity);
    let mut events = bridge.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => log::info!("[Event] {}", line),
                Err(e) => log::warn!("[Event] Failed to serialize event: {}", e),
            }
        }
    });

    let manager = ConnectionManager::new(Arc::new(probe), Arc::new(bridge), &core_config);
    manager.attach_surface(Arc::new(LoggingSurface));

    if let Some(url) = args.url {
        log::info!("Connecting to {}", url);
        match manager.connect(&url).await {
            ConnectOutcome::Connected => log::info!("Stream connected"),
            ConnectOutcome::Rejected(err) => log::warn!("Connect rejected: {}", err),
            ConnectOutcome::Superseded => log::warn!("Connect attempt superseded"),
        }
    } else {
        log::info!("No --url given; presenting the fallback asset only");
    }

    let target = manager.playback_target();
    log::info!(
        "Playback target: url={} playing={}",
        target.url,
        target.playing
    );

    // Wait for shutdown signal
    shutdown_signal().await;

    log::info!("Shutdown signal received, disconnecting...");
    manager.disconnect();

    log::info!("Shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
