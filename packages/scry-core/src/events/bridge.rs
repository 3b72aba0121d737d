//! Bridge implementation that maps viewer events to broadcast transport.
//!
//! The [`BroadcastEventBridge`] sits between the connection machine and the
//! shell, forwarding typed events to a `tokio::sync::broadcast` channel that
//! shell components (toast surface, status line) subscribe to.

use tokio::sync::broadcast;

use super::emitter::EventEmitter;
use super::{ConnectionEvent, NoticeEvent, ViewerEvent};

/// Bridges viewer events to a broadcast channel.
///
/// # Thread Safety
///
/// The bridge is `Send + Sync` and can be shared across async tasks.
#[derive(Clone)]
pub struct BroadcastEventBridge {
    tx: broadcast::Sender<ViewerEvent>,
}

impl BroadcastEventBridge {
    /// Creates a new bridge with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Returns a new receiver for the broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewerEvent> {
        self.tx.subscribe()
    }

    /// Returns a reference to the broadcast sender.
    pub fn sender(&self) -> &broadcast::Sender<ViewerEvent> {
        &self.tx
    }

    fn send(&self, event: ViewerEvent) {
        if let Err(e) = self.tx.send(event) {
            log::trace!("[EventBridge] No broadcast receivers: {}", e);
        }
    }
}

impl EventEmitter for BroadcastEventBridge {
    fn emit_connection(&self, event: ConnectionEvent) {
        self.send(ViewerEvent::Connection(event));
    }

    fn emit_notice(&self, event: NoticeEvent) {
        self.send(ViewerEvent::Notice(event));
    }
}
