// -
// Resource identity

/// Qualified resource name reported by cache lookups
pub(crate) const BUG_RESOURCE: &str = "bugs.search.bugzilla.org";

// -
// Watch defaults

/// Output channel capacity: sized to absorb one poll's worth of events
pub(crate) const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;

/// Upper bound on a single watch session before the caller must resume
pub(crate) const DEFAULT_MAX_WATCH_DURATION_MS: u64 = 30 * 60 * 1000;

// -
// Status codes carried by terminal watch events

/// Session lifetime elapsed, resume from the last observed resource version
pub const STATUS_CODE_EXPIRED: u16 = 410;

/// Upstream search failure
pub const STATUS_CODE_INTERNAL_ERROR: u16 = 500;
