//! Cooperative cancellation handle.

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Cloneable handle used to halt a translation job.
///
/// `stop()` is idempotent and may be called from any task. It takes effect
/// asynchronously: workers check it before starting a batch and before each
/// retry, and the result stream stops yielding once it observes the flag.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a halt.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!("Stop requested");
        }
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once `stop()` has been called.
    pub fn stopped(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Token cancelled by `stop()` that can additionally be cancelled on its own.
    pub(crate) fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }
}
