//! Event system for the viewer shell.
//!
//! This module provides:
//! - [`EventEmitter`] trait for the connection machine to emit events
//! - [`BroadcastEventBridge`] mapping events onto a broadcast channel
//! - Event types for connection lifecycle and user-facing notices

mod bridge;
mod emitter;

pub use bridge::BroadcastEventBridge;
pub use emitter::{EventEmitter, LoggingEventEmitter, NoopEventEmitter};

use serde::Serialize;

/// Events broadcast to the viewer shell.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "category", rename_all = "camelCase")]
pub enum ViewerEvent {
    /// Connection lifecycle events.
    Connection(ConnectionEvent),

    /// User-facing notices (error toasts).
    Notice(NoticeEvent),
}

/// Events describing connection state changes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConnectionEvent {
    /// A stream URL passed validation and probing and is now playing.
    Connected {
        /// The connected stream URL.
        url: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// A connect attempt was rejected by validation or by the probe.
    ConnectFailed {
        /// Machine-readable failure code.
        code: &'static str,
        /// User-facing failure message.
        message: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// The stream was disconnected.
    Disconnected {
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// A connected stream faulted during playback.
    PlaybackFault {
        /// User-facing fault message.
        message: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
}

/// A transient user-facing notice with a bounded display duration.
///
/// Consumed by the notification surface; dismissal comes back either from
/// the auto-dismiss timer or an explicit user action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeEvent {
    /// The message to display.
    pub message: String,
    /// How long the notice should stay visible, in milliseconds.
    #[serde(rename = "displayDurationMs")]
    pub display_duration_ms: u64,
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
}

impl From<ConnectionEvent> for ViewerEvent {
    fn from(event: ConnectionEvent) -> Self {
        ViewerEvent::Connection(event)
    }
}

impl From<NoticeEvent> for ViewerEvent {
    fn from(event: NoticeEvent) -> Self {
        ViewerEvent::Notice(event)
    }
}
