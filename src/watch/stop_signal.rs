use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Why a session stopped. Only the first reason is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A caller invoked `stop()`
    Requested,
    /// The lifetime guard fired
    Expired,
    /// The search call failed
    Failed,
    /// The session task exited on its own
    Finished,
}

/// One-shot cancellation shared by a session, its lifetime guard and any
/// number of callers.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<StopSignalInner>,
}

#[derive(Debug, Default)]
struct StopSignalInner {
    reason: Mutex<Option<StopReason>>,
    token: CancellationToken,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Returns `false` if the signal had already fired.
    pub fn stop(&self) -> bool {
        self.trigger(StopReason::Requested)
    }

    pub(crate) fn trigger(
        &self,
        reason: StopReason,
    ) -> bool {
        let mut guard = self.inner.reason.lock();
        if guard.is_some() {
            return false;
        }
        *guard = Some(reason);
        self.inner.token.cancel();
        true
    }

    pub fn reason(&self) -> Option<StopReason> {
        *self.inner.reason.lock()
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Resolves once the signal has fired.
    pub async fn stopped(&self) {
        self.inner.token.cancelled().await
    }
}
