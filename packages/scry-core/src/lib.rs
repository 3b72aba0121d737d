//! Scry Core - stream connection and fallback management.
//!
//! This crate provides the core of Scry, a viewer for user-supplied network
//! video streams: it validates and probes a submitted URL, tracks the
//! connection state, converts connection and playback failures into
//! dismissible notices, and resolves a locally bundled placeholder asset to
//! present whenever no stream is active.
//!
//! # Architecture
//!
//! - [`connection`]: the connection state machine (the heart of the crate)
//! - [`probe`]: best-effort reachability checks against candidate URLs
//! - [`assets`]: fallback placeholder resolution from the asset directory
//! - [`surface`]: the playback-surface boundary consuming targets
//! - [`events`]: event emission for the viewer shell
//! - [`state`]: configuration
//! - [`error`]: gating error classification
//!
//! # Abstraction Traits
//!
//! Platform-specific edges are traits so shells and tests can substitute
//! their own implementations:
//!
//! - [`StreamProbe`](probe::StreamProbe): liveness checking
//! - [`PlaybackSurface`](surface::PlaybackSurface): media presentation
//! - [`EventEmitter`](events::EventEmitter): event delivery

#![warn(clippy::all)]

pub mod assets;
pub mod connection;
pub mod error;
pub mod events;
mod notice;
pub mod probe;
pub mod state;
pub mod surface;
pub mod utils;

// Re-export commonly used types at the crate root
pub use assets::{FallbackAsset, FallbackResolver, ResolutionError};
pub use connection::{
    ActiveError, ConnectOutcome, ConnectionManager, ConnectionSnapshot, ConnectionState,
    StreamRequest,
};
pub use error::{ConnectError, ErrorCode};
pub use events::{
    BroadcastEventBridge, ConnectionEvent, EventEmitter, LoggingEventEmitter, NoopEventEmitter,
    NoticeEvent, ViewerEvent,
};
pub use probe::{HttpProbe, Reachability, StreamProbe};
pub use state::ViewerConfig;
pub use surface::{LoggingSurface, NullSurface, PlaybackSurface, PlaybackTarget};
pub use utils::now_millis;
