use lazy_static::lazy_static;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::Opts;
use prometheus::Registry;


lazy_static! {
    pub static ref WATCH_SESSIONS_STARTED: IntCounter = IntCounter::new(
        "watch_sessions_started",
        "Number of watch sessions opened"
    )
    .expect("metric can not be created");

    pub static ref WATCH_SESSIONS_EXPIRED: IntCounter = IntCounter::new(
        "watch_sessions_expired",
        "Number of watch sessions closed by the lifetime bound"
    )
    .expect("metric can not be created");

    /// outcome: ok | empty | skipped | error
    pub static ref WATCH_POLLS: IntCounterVec = IntCounterVec::new(
        Opts::new("watch_polls", "Delta queries issued by watch sessions"),
        &["outcome"]
    )
    .expect("metric can not be created");

    /// event_type: added | modified | error
    pub static ref WATCH_EVENTS: IntCounterVec = IntCounterVec::new(
        Opts::new("watch_events", "Events delivered to watch consumers"),
        &["event_type"]
    )
    .expect("metric can not be created");

    /// action: list | rewatch
    pub static ref INFORMER_CYCLES: IntCounterVec = IntCounterVec::new(
        Opts::new("informer_cycles", "Lists and watch resumptions performed by informers"),
        &["action"]
    )
    .expect("metric can not be created");
}

/// Registers every informer collector with `registry`.
pub fn register_custom_metrics(registry: &Registry) -> prometheus::Result<()> {
    registry.register(Box::new(WATCH_SESSIONS_STARTED.clone()))?;
    registry.register(Box::new(WATCH_SESSIONS_EXPIRED.clone()))?;
    registry.register(Box::new(WATCH_POLLS.clone()))?;
    registry.register(Box::new(WATCH_EVENTS.clone()))?;
    registry.register(Box::new(INFORMER_CYCLES.clone()))?;
    Ok(())
}

/// Renders `registry` in the Prometheus text exposition format.
pub fn gather_text(registry: &Registry) -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!("could not encode custom metrics: {}", e);
    };
    String::from_utf8(buffer).unwrap_or_default()
}
