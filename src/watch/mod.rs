//! Watch emulation over a time-filtered search
//!
//! The search API can only answer "which bugs changed since T". A watch
//! session turns repeated answers to that question into an ordered event
//! stream:
//!
//! ```text
//! PeriodicWatcher::start(rv)
//!   ├─> session task
//!   │     bootstrap: W = truncate(rv) + 1s
//!   │     throttle:  sleep until max(now, W + interval)
//!   │     loop every interval:
//!   │        search(changed since W) ─> sort ─> filter ─> classify ─> send
//!   │        W = max(last_change_time)
//!   └─> lifetime guard task
//!         after max_watch_duration: stop(Expired)
//! ```
//!
//! # Delivery
//!
//! - Events of one poll are delivered in non-decreasing change-time order,
//!   and a poll's batch is fully delivered before the next poll runs.
//! - The event channel is bounded: a slow consumer stalls the session but
//!   never loses events.
//! - An `Error` event is always the last event of a session. Expiry and
//!   search failures produce one; an explicit stop does not.
//! - The channel closes exactly once, after the session task has exited.
//!
//! # Stopping
//!
//! `stop()` is idempotent and never blocks. A consumer that stops while
//! events are still buffered should keep draining until the channel closes
//! (see [`PeriodicWatcher::stop_and_drain`]), or simply drop the watcher.

mod periodic_watcher;
mod stop_signal;


use std::sync::Arc;
use std::time::Duration;

pub use periodic_watcher::*;
use serde::Deserialize;
use serde::Serialize;
pub use stop_signal::*;

use crate::constants::STATUS_CODE_EXPIRED;
use crate::constants::STATUS_CODE_INTERNAL_ERROR;
use crate::Bug;
use crate::BugInfo;
use crate::TransportError;

/// Decides whether a fetched bug is surfaced at all.
pub type IncludeFn = Arc<dyn Fn(&BugInfo) -> bool + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WatchEvent {
    /// First observation of a bug created at or after the session start
    Added(Bug),
    /// Change to a bug that existed before the session start
    Modified(Bug),
    /// Terminal session fault
    Error(Status),
}

impl WatchEvent {
    pub fn type_name(&self) -> &'static str {
        match self {
            WatchEvent::Added(_) => "added",
            WatchEvent::Modified(_) => "modified",
            WatchEvent::Error(_) => "error",
        }
    }

    pub fn bug(&self) -> Option<&Bug> {
        match self {
            WatchEvent::Added(bug) | WatchEvent::Modified(bug) => Some(bug),
            WatchEvent::Error(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusReason {
    /// The session hit its lifetime bound; resume from the last watermark
    Expired,
    /// The upstream search failed
    InternalError,
}

/// Payload of a terminal `Error` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub reason: StatusReason,
    pub code: u16,
    pub message: String,
}

impl Status {
    pub fn expired(lifetime: Duration) -> Self {
        Self {
            reason: StatusReason::Expired,
            code: STATUS_CODE_EXPIRED,
            message: format!(
                "watch closed after {:?}, resume from the last observed resource version",
                lifetime
            ),
        }
    }

    pub fn internal_error(err: &TransportError) -> Self {
        Self {
            reason: StatusReason::InternalError,
            code: STATUS_CODE_INTERNAL_ERROR,
            message: format!("Internal error occurred: {}", err),
        }
    }

    /// Expired sessions are resumed from the last watermark. Anything else
    /// requires a fresh list.
    pub fn is_resumable(&self) -> bool {
        self.reason == StatusReason::Expired
    }
}
