//! Event emitter abstraction for decoupling the machine from transport.
//!
//! The connection machine depends on the [`EventEmitter`] trait rather than
//! a concrete channel, enabling testing and alternative transports.

use super::{ConnectionEvent, NoticeEvent};

/// Trait for emitting viewer events without knowledge of transport.
pub trait EventEmitter: Send + Sync {
    /// Emits a connection lifecycle event.
    fn emit_connection(&self, event: ConnectionEvent);

    /// Emits a user-facing notice.
    fn emit_notice(&self, event: NoticeEvent);
}

/// No-op emitter for embedding the machine without a shell.
///
/// Events are silently discarded.
pub struct NoopEventEmitter;

impl EventEmitter for NoopEventEmitter {
    fn emit_connection(&self, _event: ConnectionEvent) {
        // No-op
    }

    fn emit_notice(&self, _event: NoticeEvent) {
        // No-op
    }
}

/// Logging emitter for debugging and development.
///
/// Logs all events at debug level.
pub struct LoggingEventEmitter;

impl EventEmitter for LoggingEventEmitter {
    fn emit_connection(&self, event: ConnectionEvent) {
        tracing::debug!(?event, "connection_event");
    }

    fn emit_notice(&self, event: NoticeEvent) {
        tracing::debug!(?event, "notice_event");
    }
}
