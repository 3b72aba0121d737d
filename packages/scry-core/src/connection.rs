//! Connection state machine for the stream viewer.
//!
//! [`ConnectionManager`] owns the connection state, the submitted stream
//! URL, the single active error, and the cached fallback asset. All
//! mutation goes through its operations: [`connect`](ConnectionManager::connect),
//! [`disconnect`](ConnectionManager::disconnect),
//! [`report_playback_error`](ConnectionManager::report_playback_error) and
//! [`dismiss_error`](ConnectionManager::dismiss_error). External components
//! only read, via [`snapshot`](ConnectionManager::snapshot) and
//! [`playback_target`](ConnectionManager::playback_target).
//!
//! A connect attempt suspends on the reachability probe without blocking
//! other operations. Each attempt carries a monotonic generation token; a
//! completion is committed only while its token is still current, so a probe
//! answer arriving after a disconnect or a newer attempt changes nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use crate::assets::{FallbackAsset, FallbackResolver};
use crate::error::{ConnectError, ErrorCode};
use crate::events::{ConnectionEvent, EventEmitter, NoticeEvent};
use crate::notice::DismissTimer;
use crate::probe::{Reachability, StreamProbe};
use crate::state::ViewerConfig;
use crate::surface::{PlaybackSurface, PlaybackTarget};
use crate::utils::now_millis;

/// Connection lifecycle states.
///
/// `Idle` and `Disconnected` are observably equivalent (no stream, no
/// pending attempt); the machine starts `Idle` and never returns to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Disconnected,
    Errored,
}

impl ConnectionState {
    /// True when no stream is active and no attempt is in flight.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Idle | Self::Disconnected)
    }
}

/// A user-submitted connect request. One per attempt, never persisted.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    raw_url: String,
}

impl StreamRequest {
    /// Wraps the raw URL string as submitted.
    pub fn new(raw_url: impl Into<String>) -> Self {
        Self {
            raw_url: raw_url.into(),
        }
    }

    /// The URL exactly as submitted.
    #[must_use]
    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    /// Only `http://` and `https://` URLs are accepted.
    #[must_use]
    pub fn has_supported_scheme(&self) -> bool {
        self.raw_url.starts_with("http://") || self.raw_url.starts_with("https://")
    }
}

/// The single user-visible error. A new error always replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveError {
    /// User-facing message, already prefixed for display.
    pub message: String,
    /// Unix millis when the error was recorded.
    pub timestamp: Option<u64>,
    /// Monotonic sequence pairing this error with its dismiss timer and
    /// with the disconnect staleness rule.
    pub(crate) seq: u64,
}

/// What a connect attempt did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Validation and probe both passed; the machine is connected.
    Connected,
    /// Validation or probe failed; the failure is now the active error.
    Rejected(ConnectError),
    /// A newer connect or a disconnect superseded this attempt; nothing changed.
    Superseded,
}

/// Read-only view of the machine, taken under the state lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    pub state: ConnectionState,
    /// The connected stream URL; empty whenever not connected.
    pub stream_url: String,
    pub error: Option<ActiveError>,
    /// Path of the cached fallback asset.
    pub fallback_path: String,
}

/// Owned mutable state. Exactly one instance per machine, behind one lock.
struct ViewState {
    state: ConnectionState,
    stream_url: String,
    active_error: Option<ActiveError>,
    fallback: FallbackAsset,
    /// Highest error seq already carried through a disconnect cycle.
    /// A later explicit disconnect may clear an error at or below this mark;
    /// it must never clear one above it.
    error_seen_by_disconnect: u64,
}

/// The stream connection & fallback manager.
///
/// Construct with [`ConnectionManager::new`] inside a Tokio runtime (dismiss
/// timers are spawned tasks) and share as `Arc`.
pub struct ConnectionManager {
    view: Mutex<ViewState>,
    /// Generation token for probe completions; bumped by every connect and
    /// every disconnect-like transition.
    generation: AtomicU64,
    error_seq: AtomicU64,
    probe: Arc<dyn StreamProbe>,
    resolver: FallbackResolver,
    emitter: Arc<dyn EventEmitter>,
    surface: RwLock<Option<Arc<dyn PlaybackSurface>>>,
    dismiss_timer: Mutex<Option<DismissTimer>>,
    notice_duration_ms: u64,
    weak_self: Weak<ConnectionManager>,
}

impl ConnectionManager {
    /// Creates the machine and performs the mount-time fallback resolution.
    pub fn new(
        probe: Arc<dyn StreamProbe>,
        emitter: Arc<dyn EventEmitter>,
        config: &ViewerConfig,
    ) -> Arc<Self> {
        let resolver = FallbackResolver::new(&config.asset_root);
        let initial_fallback = resolver.default_asset();
        let manager = Arc::new_cyclic(|weak| Self {
            view: Mutex::new(ViewState {
                state: ConnectionState::Idle,
                stream_url: String::new(),
                active_error: None,
                fallback: initial_fallback,
                error_seen_by_disconnect: 0,
            }),
            generation: AtomicU64::new(0),
            error_seq: AtomicU64::new(0),
            probe,
            resolver,
            emitter,
            surface: RwLock::new(None),
            dismiss_timer: Mutex::new(None),
            notice_duration_ms: config.notice_duration_ms,
            weak_self: weak.clone(),
        });
        manager.refresh_fallback();
        manager
    }

    /// Attaches the playback surface and pushes the current target to it.
    pub fn attach_surface(&self, surface: Arc<dyn PlaybackSurface>) {
        surface.target_changed(&self.playback_target());
        *self.surface.write() = Some(surface);
    }

    /// Attempts to connect to `raw_url`.
    ///
    /// Syntax validation and the reachability probe both gate success: a
    /// reachable-but-malformed URL must not connect, and neither must a
    /// well-formed unreachable one. On failure the URL is cleared, the
    /// failure becomes the active error and the fallback is re-resolved.
    /// An attempt superseded by a newer connect or a disconnect commits
    /// nothing.
    pub async fn connect(&self, raw_url: &str) -> ConnectOutcome {
        let request = StreamRequest::new(raw_url);
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.view.lock().state = ConnectionState::Connecting;
        self.notify_surface();

        let scheme_ok = request.has_supported_scheme();
        let reachability = self.probe.probe(request.raw_url()).await;

        if self.generation.load(Ordering::SeqCst) != token {
            log::debug!(
                "[Connection] Discarding stale probe completion for {}",
                request.raw_url()
            );
            return ConnectOutcome::Superseded;
        }

        let gate = if !scheme_ok {
            Err(ConnectError::InvalidUrl)
        } else if reachability == Reachability::Unreachable {
            Err(ConnectError::Unreachable)
        } else {
            Ok(())
        };

        match gate {
            Ok(()) => {
                {
                    let mut view = self.view.lock();
                    view.stream_url = request.raw_url().to_string();
                    view.state = ConnectionState::Connected;
                    view.active_error = None;
                }
                *self.dismiss_timer.lock() = None;
                log::info!("[Connection] Connected to {}", request.raw_url());
                self.emitter.emit_connection(ConnectionEvent::Connected {
                    url: request.raw_url().to_string(),
                    timestamp: now_millis(),
                });
                self.notify_surface();
                ConnectOutcome::Connected
            }
            Err(err) => {
                log::info!(
                    "[Connection] Connect to {} rejected: {}",
                    request.raw_url(),
                    err
                );
                let message = self.fail(err.to_string());
                self.emitter.emit_connection(ConnectionEvent::ConnectFailed {
                    code: err.code(),
                    message,
                    timestamp: now_millis(),
                });
                ConnectOutcome::Rejected(err)
            }
        }
    }

    /// Disconnects the current stream. Idempotent: a no-op when nothing is
    /// connected or in flight.
    ///
    /// Clears the active error only if that error already survived a full
    /// disconnect cycle; an error newer than the last cycle stays visible.
    pub fn disconnect(&self) {
        let mut error_cleared = false;
        {
            let mut view = self.view.lock();
            if view.state.is_disconnected() {
                return;
            }
            // In-flight probes for the departing request must not resurrect it.
            self.generation.fetch_add(1, Ordering::SeqCst);
            view.stream_url.clear();
            view.state = ConnectionState::Disconnected;
            match view.active_error.as_ref().map(|err| err.seq) {
                Some(seq) if seq <= view.error_seen_by_disconnect => {
                    view.active_error = None;
                    error_cleared = true;
                }
                Some(seq) => view.error_seen_by_disconnect = seq,
                None => {}
            }
        }
        if error_cleared {
            *self.dismiss_timer.lock() = None;
        }
        log::info!("[Connection] Disconnected");
        self.emitter
            .emit_connection(ConnectionEvent::Disconnected {
                timestamp: now_millis(),
            });
        self.refresh_fallback();
        self.notify_surface();
    }

    /// Reports an asynchronous playback fault from the surface.
    ///
    /// Applies disconnect semantics, records the fault as the active error
    /// and re-resolves the fallback asset unconditionally.
    pub fn report_playback_error(&self, reason: &str) {
        // The fault wins over any probe still in flight.
        self.generation.fetch_add(1, Ordering::SeqCst);
        log::warn!("[Connection] Playback fault: {}", reason);
        let message = self.fail(reason.to_string());
        self.emitter
            .emit_connection(ConnectionEvent::PlaybackFault {
                message,
                timestamp: now_millis(),
            });
    }

    /// Dismisses the active error, from the user or the expiry timer.
    ///
    /// An `Errored` machine moves to `Disconnected`; every other state is
    /// left untouched.
    pub fn dismiss_error(&self) {
        let seq = match &self.view.lock().active_error {
            Some(err) => err.seq,
            None => return,
        };
        self.dismiss(seq);
    }

    /// Read-only view of the machine.
    pub fn snapshot(&self) -> ConnectionSnapshot {
        let view = self.view.lock();
        ConnectionSnapshot {
            state: view.state,
            stream_url: view.stream_url.clone(),
            error: view.active_error.clone(),
            fallback_path: view.fallback.path.clone(),
        }
    }

    /// What the playback surface should present right now. Recomputed on
    /// every call, never cached.
    pub fn playback_target(&self) -> PlaybackTarget {
        let view = self.view.lock();
        if view.state == ConnectionState::Connected {
            PlaybackTarget {
                url: view.stream_url.clone(),
                playing: true,
            }
        } else {
            PlaybackTarget {
                url: view.fallback.path.clone(),
                playing: false,
            }
        }
    }

    /// Applies a failure transition: clears the URL, replaces the active
    /// error, enters `Errored`, refreshes the fallback and arms the dismiss
    /// timer. Returns the displayed message.
    fn fail(&self, cause: String) -> String {
        let message = format!("An error occurred: {cause}");
        let seq = self.error_seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut view = self.view.lock();
            view.stream_url.clear();
            view.state = ConnectionState::Errored;
            view.active_error = Some(ActiveError {
                message: message.clone(),
                timestamp: Some(now_millis()),
                seq,
            });
            // This transition carries its own disconnect cycle: the next
            // explicit disconnect may clear the error, this one must not.
            view.error_seen_by_disconnect = seq;
        }
        self.refresh_fallback();
        self.arm_dismiss_timer(seq);
        self.emitter.emit_notice(NoticeEvent {
            message: message.clone(),
            display_duration_ms: self.notice_duration_ms,
            timestamp: now_millis(),
        });
        self.notify_surface();
        message
    }

    /// Clears the error identified by `seq` if it is still the active one.
    fn dismiss(&self, seq: u64) {
        let mut entered_disconnected = false;
        {
            let mut view = self.view.lock();
            // A newer error may own the notice by now.
            if view.active_error.as_ref().map(|err| err.seq) != Some(seq) {
                return;
            }
            view.active_error = None;
            if view.state == ConnectionState::Errored {
                view.state = ConnectionState::Disconnected;
                entered_disconnected = true;
            }
        }
        *self.dismiss_timer.lock() = None;
        if entered_disconnected {
            self.refresh_fallback();
            self.notify_surface();
        }
    }

    /// Fire-and-forget fallback refresh: failures are absorbed and the
    /// cached asset never regresses.
    fn refresh_fallback(&self) {
        match self.resolver.resolve() {
            Ok(asset) => self.view.lock().fallback = asset,
            Err(e) => {
                let kept = self.view.lock().fallback.path.clone();
                log::warn!(
                    "[Connection] Fallback resolution failed ({}); keeping {}",
                    e,
                    kept
                );
            }
        }
    }

    fn arm_dismiss_timer(&self, seq: u64) {
        let weak = self.weak_self.clone();
        let timer = DismissTimer::arm(
            Duration::from_millis(self.notice_duration_ms),
            move || {
                if let Some(manager) = weak.upgrade() {
                    manager.dismiss(seq);
                }
            },
        );
        // Replacing the slot drops (and thereby cancels) the previous timer.
        *self.dismiss_timer.lock() = Some(timer);
    }

    fn notify_surface(&self) {
        let surface = self.surface.read().clone();
        if let Some(surface) = surface {
            surface.target_changed(&self.playback_target());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{NoopEventEmitter, ViewerEvent};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    const FAST_URL: &str = "https://live.example.com/s1";
    const SLOW_URL: &str = "https://slow.example.com/s1";

    /// Probe answering every URL the same way, after an optional delay.
    struct ScriptedProbe {
        outcome: Reachability,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl ScriptedProbe {
        fn answering(outcome: Reachability) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl StreamProbe for ScriptedProbe {
        async fn probe(&self, _url: &str) -> Reachability {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.outcome
        }
    }

    /// Probe with per-URL delay and outcome, for completion-order tests.
    struct RoutedProbe {
        routes: HashMap<&'static str, (Duration, Reachability)>,
    }

    #[async_trait]
    impl StreamProbe for RoutedProbe {
        async fn probe(&self, url: &str) -> Reachability {
            let (delay, outcome) = self.routes[url];
            tokio::time::sleep(delay).await;
            outcome
        }
    }

    /// Emitter recording every event for assertions.
    #[derive(Default)]
    struct RecordingEmitter {
        events: Mutex<Vec<ViewerEvent>>,
    }

    impl EventEmitter for RecordingEmitter {
        fn emit_connection(&self, event: ConnectionEvent) {
            self.events.lock().push(ViewerEvent::Connection(event));
        }

        fn emit_notice(&self, event: NoticeEvent) {
            self.events.lock().push(ViewerEvent::Notice(event));
        }
    }

    /// Surface recording every pushed target.
    #[derive(Default)]
    struct RecordingSurface {
        targets: Mutex<Vec<PlaybackTarget>>,
    }

    impl PlaybackSurface for RecordingSurface {
        fn target_changed(&self, target: &PlaybackTarget) {
            self.targets.lock().push(target.clone());
        }
    }

    fn asset_dir_with_placeholder() -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("placeholder.mp4"), b"media").expect("write");
        dir
    }

    fn config_for(dir: &TempDir) -> ViewerConfig {
        ViewerConfig {
            asset_root: dir.path().to_path_buf(),
            notice_duration_ms: 500,
            ..Default::default()
        }
    }

    fn manager_with(probe: Arc<dyn StreamProbe>, dir: &TempDir) -> Arc<ConnectionManager> {
        ConnectionManager::new(probe, Arc::new(NoopEventEmitter), &config_for(dir))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // StreamRequest
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn scheme_check_accepts_only_http_and_https() {
        assert!(StreamRequest::new("http://cam.local/1").has_supported_scheme());
        assert!(StreamRequest::new("https://live.example.com/s1").has_supported_scheme());
        assert!(!StreamRequest::new("ftp://example.com/stream").has_supported_scheme());
        assert!(!StreamRequest::new("rtsp://cam.local/1").has_supported_scheme());
        assert!(!StreamRequest::new("").has_supported_scheme());
        // Prefix match is case-sensitive, as in the original input handling.
        assert!(!StreamRequest::new("HTTP://cam.local/1").has_supported_scheme());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Connect gating
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn connect_succeeds_with_reachable_url() {
        let dir = asset_dir_with_placeholder();
        let manager = manager_with(ScriptedProbe::answering(Reachability::Reachable), &dir);

        let outcome = manager.connect(FAST_URL).await;
        assert_eq!(outcome, ConnectOutcome::Connected);

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Connected);
        assert_eq!(snapshot.stream_url, FAST_URL);
        assert!(snapshot.error.is_none());

        let target = manager.playback_target();
        assert!(target.playing);
        assert_eq!(target.url, FAST_URL);
    }

    #[tokio::test]
    async fn connect_rejects_unsupported_scheme() {
        let dir = asset_dir_with_placeholder();
        let manager = manager_with(ScriptedProbe::answering(Reachability::Unreachable), &dir);

        let outcome = manager.connect("ftp://example.com/stream").await;
        assert_eq!(outcome, ConnectOutcome::Rejected(ConnectError::InvalidUrl));

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Errored);
        assert!(snapshot.stream_url.is_empty());
        let error = snapshot.error.expect("active error");
        assert!(error.message.contains("valid URL"));
        assert!(error.timestamp.is_some());
    }

    #[tokio::test]
    async fn reachable_probe_does_not_rescue_invalid_url() {
        let dir = asset_dir_with_placeholder();
        let manager = manager_with(ScriptedProbe::answering(Reachability::Reachable), &dir);

        let outcome = manager.connect("rtsp://cam.local/1").await;
        assert_eq!(outcome, ConnectOutcome::Rejected(ConnectError::InvalidUrl));
        assert_eq!(manager.snapshot().state, ConnectionState::Errored);
    }

    #[tokio::test]
    async fn connect_errors_when_probe_unreachable() {
        let dir = asset_dir_with_placeholder();
        let manager = manager_with(ScriptedProbe::answering(Reachability::Unreachable), &dir);

        let outcome = manager.connect(FAST_URL).await;
        assert_eq!(outcome, ConnectOutcome::Rejected(ConnectError::Unreachable));

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Errored);
        assert!(snapshot.stream_url.is_empty());
        let error = snapshot.error.expect("active error");
        assert!(error.message.contains("stream is down"));

        // While errored, the surface presents the fallback, not playing.
        let target = manager.playback_target();
        assert!(!target.playing);
        assert!(target.url.ends_with("placeholder.mp4"));
    }

    #[tokio::test]
    async fn reconnect_clears_previous_error() {
        let dir = asset_dir_with_placeholder();
        let probe = Arc::new(ScriptedProbe {
            outcome: Reachability::Reachable,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        });
        let manager = manager_with(probe, &dir);

        manager.connect("ftp://bad").await;
        assert!(manager.snapshot().error.is_some());

        manager.connect(FAST_URL).await;
        let snapshot = manager.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Connected);
        assert!(snapshot.error.is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Disconnect
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn disconnect_twice_matches_disconnect_once() {
        let dir = asset_dir_with_placeholder();
        let manager = manager_with(ScriptedProbe::answering(Reachability::Reachable), &dir);

        manager.connect(FAST_URL).await;
        manager.disconnect();
        let once = manager.snapshot();
        assert_eq!(once.state, ConnectionState::Disconnected);
        assert!(once.stream_url.is_empty());

        manager.disconnect();
        assert_eq!(manager.snapshot(), once);
    }

    #[tokio::test]
    async fn disconnect_from_errored_is_idempotent_too() {
        let dir = asset_dir_with_placeholder();
        let manager = manager_with(ScriptedProbe::answering(Reachability::Unreachable), &dir);

        manager.connect(FAST_URL).await;
        manager.disconnect();
        let once = manager.snapshot();
        manager.disconnect();
        assert_eq!(manager.snapshot(), once);
    }

    #[tokio::test]
    async fn disconnect_clears_an_error_from_a_previous_cycle() {
        let dir = asset_dir_with_placeholder();
        let manager = manager_with(ScriptedProbe::answering(Reachability::Unreachable), &dir);

        // The failure transition itself carried a disconnect cycle, so an
        // explicit disconnect afterwards finds the error stale and clears it.
        manager.connect(FAST_URL).await;
        assert!(manager.snapshot().error.is_some());

        manager.disconnect();
        let snapshot = manager.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Disconnected);
        assert!(snapshot.error.is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dismissal
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn dismiss_clears_error_and_parks_errored_state() {
        let dir = asset_dir_with_placeholder();
        let manager = manager_with(ScriptedProbe::answering(Reachability::Unreachable), &dir);

        manager.connect(FAST_URL).await;
        manager.dismiss_error();

        let snapshot = manager.snapshot();
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.state, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn dismiss_keeps_connected_state() {
        let dir = asset_dir_with_placeholder();
        let manager = manager_with(ScriptedProbe::answering(Reachability::Reachable), &dir);

        manager.connect(FAST_URL).await;
        manager.dismiss_error();

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Connected);
        assert_eq!(snapshot.stream_url, FAST_URL);
    }

    #[tokio::test]
    async fn dismiss_without_error_is_noop() {
        let dir = asset_dir_with_placeholder();
        let manager = manager_with(ScriptedProbe::answering(Reachability::Reachable), &dir);

        let before = manager.snapshot();
        manager.dismiss_error();
        assert_eq!(manager.snapshot(), before);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Playback faults and fallback refresh
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn playback_error_disconnects_and_refreshes_fallback() {
        // Start with an empty asset dir: the machine keeps the assumed
        // default until a refresh can actually resolve something.
        let dir = TempDir::new().expect("tempdir");
        let manager = manager_with(ScriptedProbe::answering(Reachability::Reachable), &dir);

        manager.connect(FAST_URL).await;
        assert_eq!(manager.snapshot().state, ConnectionState::Connected);

        // An asset appears while connected; the fault must re-resolve.
        std::fs::write(dir.path().join("live-backup.mp4"), b"media").expect("write");
        manager.report_playback_error("decode failure");

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Errored);
        assert!(snapshot.stream_url.is_empty());
        assert!(snapshot.fallback_path.ends_with("live-backup.mp4"));
        let error = snapshot.error.expect("active error");
        assert_eq!(error.message, "An error occurred: decode failure");
    }

    #[tokio::test]
    async fn empty_asset_dir_keeps_previous_fallback() {
        let dir = TempDir::new().expect("tempdir");
        let manager = manager_with(ScriptedProbe::answering(Reachability::Unreachable), &dir);

        let initial = manager.snapshot().fallback_path;
        assert!(initial.ends_with("placeholder.mp4"));

        // Failure triggers a re-resolution that finds nothing; the cached
        // value must not regress to empty.
        manager.connect(FAST_URL).await;
        assert_eq!(manager.snapshot().fallback_path, initial);
    }

    #[tokio::test]
    async fn mount_time_resolution_picks_up_the_asset() {
        let dir = asset_dir_with_placeholder();
        let manager = manager_with(ScriptedProbe::answering(Reachability::Reachable), &dir);

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Idle);
        assert!(snapshot.state.is_disconnected());
        assert!(snapshot.fallback_path.ends_with("placeholder.mp4"));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Stale completions
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn slow_probe_loses_to_newer_connect() {
        let dir = asset_dir_with_placeholder();
        let probe = Arc::new(RoutedProbe {
            routes: HashMap::from([
                (SLOW_URL, (Duration::from_millis(100), Reachability::Reachable)),
                (FAST_URL, (Duration::from_millis(5), Reachability::Reachable)),
            ]),
        });
        let manager = manager_with(probe, &dir);

        let slow = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.connect(SLOW_URL).await })
        };
        // Let the first attempt claim its generation and park on the probe.
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        let fast = manager.connect(FAST_URL).await;
        assert_eq!(fast, ConnectOutcome::Connected);

        assert_eq!(slow.await.expect("join"), ConnectOutcome::Superseded);

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Connected);
        assert_eq!(snapshot.stream_url, FAST_URL);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_supersedes_inflight_probe() {
        let dir = asset_dir_with_placeholder();
        let probe = Arc::new(RoutedProbe {
            routes: HashMap::from([(
                SLOW_URL,
                (Duration::from_millis(100), Reachability::Reachable),
            )]),
        });
        let manager = manager_with(probe, &dir);

        let attempt = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.connect(SLOW_URL).await })
        };
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert_eq!(manager.snapshot().state, ConnectionState::Connecting);

        manager.disconnect();

        assert_eq!(attempt.await.expect("join"), ConnectOutcome::Superseded);
        let snapshot = manager.snapshot();
        assert_eq!(snapshot.state, ConnectionState::Disconnected);
        assert!(snapshot.stream_url.is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Notice timers
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn notice_auto_dismisses_after_display_duration() {
        let dir = asset_dir_with_placeholder();
        let manager = manager_with(ScriptedProbe::answering(Reachability::Unreachable), &dir);

        manager.connect(FAST_URL).await;
        assert!(manager.snapshot().error.is_some());

        tokio::time::sleep(Duration::from_millis(510)).await;

        let snapshot = manager.snapshot();
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.state, ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timer_never_dismisses_newer_error() {
        let dir = asset_dir_with_placeholder();
        let manager = manager_with(ScriptedProbe::answering(Reachability::Unreachable), &dir);

        manager.connect(FAST_URL).await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        // A fresh error replaces the old one and restarts the clock.
        manager.report_playback_error("decode failure");
        tokio::time::sleep(Duration::from_millis(300)).await;

        let error = manager.snapshot().error.expect("newer error still active");
        assert!(error.message.contains("decode failure"));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(manager.snapshot().error.is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Events and surface notifications
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn transitions_emit_connection_and_notice_events() {
        let dir = asset_dir_with_placeholder();
        let emitter = Arc::new(RecordingEmitter::default());
        let manager = ConnectionManager::new(
            ScriptedProbe::answering(Reachability::Unreachable),
            emitter.clone(),
            &config_for(&dir),
        );

        manager.connect(FAST_URL).await;

        let events = emitter.events.lock();
        assert!(events.iter().any(|e| matches!(
            e,
            ViewerEvent::Connection(ConnectionEvent::ConnectFailed { code, .. })
                if *code == "stream_unreachable"
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, ViewerEvent::Notice(n) if n.display_duration_ms == 500)));
    }

    #[tokio::test]
    async fn surface_sees_fallback_then_stream() {
        let dir = asset_dir_with_placeholder();
        let manager = manager_with(ScriptedProbe::answering(Reachability::Reachable), &dir);
        let surface = Arc::new(RecordingSurface::default());

        manager.attach_surface(surface.clone());
        manager.connect(FAST_URL).await;

        let targets = surface.targets.lock();
        let first = targets.first().expect("initial target");
        assert!(!first.playing);
        assert!(first.url.ends_with("placeholder.mp4"));

        let last = targets.last().expect("final target");
        assert!(last.playing);
        assert_eq!(last.url, FAST_URL);
    }
}
