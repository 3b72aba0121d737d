//! Playback surface boundary.
//!
//! The surface is the external collaborator that actually renders media. The
//! core hands it a [`PlaybackTarget`] after every transition; the surface
//! reports asynchronous playback faults back by calling
//! [`ConnectionManager::report_playback_error`](crate::connection::ConnectionManager::report_playback_error)
//! on the machine.

use serde::Serialize;

/// What the playback surface should present right now.
///
/// Derived, never stored: the URL is the stream URL while connected and the
/// fallback asset path otherwise, and `playing` mirrors the connected state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackTarget {
    /// Stream URL or fallback asset path.
    pub url: String,
    /// Whether the surface should be playing (true only when connected).
    pub playing: bool,
}

/// Trait for the component consuming playback targets.
pub trait PlaybackSurface: Send + Sync {
    /// Called after every state transition with the recomputed target.
    fn target_changed(&self, target: &PlaybackTarget);
}

/// Surface that discards targets, for embedding without a renderer.
pub struct NullSurface;

impl PlaybackSurface for NullSurface {
    fn target_changed(&self, _target: &PlaybackTarget) {
        // No-op
    }
}

/// Surface that logs target changes, used by the headless harness.
pub struct LoggingSurface;

impl PlaybackSurface for LoggingSurface {
    fn target_changed(&self, target: &PlaybackTarget) {
        log::info!(
            "[Surface] url={} playing={}",
            target.url,
            target.playing
        );
    }
}
