use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_EVENT_BUFFER_SIZE;
use crate::constants::DEFAULT_MAX_WATCH_DURATION_MS;
use crate::constants::DEFAULT_POLL_INTERVAL_MS;
use crate::Error;
use crate::Result;

/// Polling and lifetime parameters of a watch session
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WatchConfig {
    /// Delay between two delta queries (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Lifetime bound of one session (milliseconds). When it elapses the
    /// session emits an expired error and the caller must resume.
    #[serde(default = "default_max_watch_duration_ms")]
    pub max_watch_duration_ms: u64,

    /// Capacity of the per-session event channel
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_watch_duration_ms: default_max_watch_duration_ms(),
            event_buffer_size: default_event_buffer_size(),
        }
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_watch_duration(&self) -> Duration {
        Duration::from_millis(self.max_watch_duration_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "watch.poll_interval_ms must be greater than 0".into(),
            ));
        }
        if self.event_buffer_size == 0 {
            return Err(Error::InvalidConfig(
                "watch.event_buffer_size must be greater than 0".into(),
            ));
        }
        if self.max_watch_duration_ms < self.poll_interval_ms {
            return Err(Error::InvalidConfig(format!(
                "watch.max_watch_duration_ms ({}) must not be shorter than poll_interval_ms ({})",
                self.max_watch_duration_ms, self.poll_interval_ms
            )));
        }
        Ok(())
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}
fn default_max_watch_duration_ms() -> u64 {
    DEFAULT_MAX_WATCH_DURATION_MS
}
fn default_event_buffer_size() -> usize {
    DEFAULT_EVENT_BUFFER_SIZE
}
