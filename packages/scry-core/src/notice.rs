//! Scoped auto-dismiss timer for active errors.
//!
//! Each active error gets its own timer, scoped to the error's lifetime:
//! dropping the timer (error replaced, dismissed, or machine reconnected)
//! cancels the pending dismissal, so a stale timer can never fire against a
//! newer error.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// A pending auto-dismissal, cancelled on drop.
pub(crate) struct DismissTimer {
    token: CancellationToken,
}

impl DismissTimer {
    /// Arms a timer that runs `on_expire` after `delay` unless cancelled.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn arm(delay: Duration, on_expire: impl FnOnce() + Send + 'static) -> Self {
        let token = CancellationToken::new();
        let guard = token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = guard.cancelled() => {}
                _ = tokio::time::sleep(delay) => on_expire(),
            }
        });
        Self { token }
    }
}

impl Drop for DismissTimer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
