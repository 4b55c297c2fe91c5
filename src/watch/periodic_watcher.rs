use std::pin::Pin;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;
use std::time::Duration;

use futures::Stream;
use nanoid::nanoid;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;
use tracing::error;
use tracing::trace;
use tracing::Instrument;

use super::IncludeFn;
use super::Status;
use super::StopReason;
use super::StopSignal;
use super::WatchEvent;
use crate::metrics::WATCH_EVENTS;
use crate::metrics::WATCH_POLLS;
use crate::metrics::WATCH_SESSIONS_EXPIRED;
use crate::metrics::WATCH_SESSIONS_STARTED;
use crate::BugList;
use crate::ResourceVersion;
use crate::SearchBugsArgs;
use crate::SearchClient;
use crate::TransportError;
use crate::WatchConfig;

/// Handle to one bounded-lifetime watch session.
///
/// Dropping the handle stops the session.
pub struct PeriodicWatcher {
    session_id: String,
    events: mpsc::Receiver<WatchEvent>,
    guard: StopOnDrop,
}

impl std::fmt::Debug for PeriodicWatcher {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("PeriodicWatcher")
            .field("session_id", &self.session_id)
            .field("stopped", &self.guard.0.is_stopped())
            .finish()
    }
}

impl PeriodicWatcher {
    /// Spawns the session and its lifetime guard on the current runtime and
    /// returns immediately.
    ///
    /// `resource_version` is the caller's watermark: every change up to and
    /// including that second has already been observed.
    pub fn start<C: SearchClient>(
        client: Arc<C>,
        args: SearchBugsArgs,
        include: IncludeFn,
        resource_version: ResourceVersion,
        config: &WatchConfig,
    ) -> Self {
        let session_id = nanoid!(10);
        let signal = StopSignal::new();
        let (sender, events) = mpsc::channel(config.event_buffer_size.max(1));

        // A watch starts on the next visible change: the cutoff is inclusive
        // at one-second precision.
        let start = resource_version.next_visible();

        let session = WatchSession {
            session_id: session_id.clone(),
            client,
            args,
            include,
            interval: config.poll_interval(),
            lifetime: config.max_watch_duration(),
            sender,
            signal: signal.clone(),
            start,
            current: start,
        };

        WATCH_SESSIONS_STARTED.inc();
        debug!(
            session_id = %session_id,
            resource_version = %resource_version,
            "Watch started"
        );
        tokio::spawn(session.run().in_current_span());

        Self {
            session_id,
            events,
            guard: StopOnDrop(signal),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Requests cancellation. Idempotent, never blocks.
    pub fn stop(&self) {
        if self.guard.0.stop() {
            debug!(session_id = %self.session_id, "Stopping watch");
        }
    }

    /// A cloneable handle that can stop this session from another task.
    pub fn stopper(&self) -> StopSignal {
        self.guard.0.clone()
    }

    pub fn results(&mut self) -> &mut mpsc::Receiver<WatchEvent> {
        &mut self.events
    }

    /// Next event, or `None` once the session has exited.
    pub async fn recv(&mut self) -> Option<WatchEvent> {
        self.events.recv().await
    }

    /// Stops the session and discards events until the channel closes.
    ///
    /// Returns the number of discarded events.
    pub async fn stop_and_drain(&mut self) -> usize {
        self.stop();
        let mut discarded = 0;
        while self.events.recv().await.is_some() {
            discarded += 1;
        }
        debug!(session_id = %self.session_id, discarded, "Stopped watch");
        discarded
    }

    pub fn into_stream(self) -> WatchStream {
        WatchStream {
            inner: ReceiverStream::new(self.events),
            _guard: self.guard,
        }
    }
}

/// `Stream` view of a watch session. Dropping it stops the session.
pub struct WatchStream {
    inner: ReceiverStream<WatchEvent>,
    _guard: StopOnDrop,
}

impl Stream for WatchStream {
    type Item = WatchEvent;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

struct StopOnDrop(StopSignal);

impl Drop for StopOnDrop {
    fn drop(&mut self) {
        self.0.stop();
    }
}

/// Why the poll loop returned
enum Exit {
    Stopped,
    Failed(TransportError),
    ConsumerGone,
}

/// State owned by the session task
struct WatchSession<C> {
    session_id: String,
    client: Arc<C>,
    args: SearchBugsArgs,
    include: IncludeFn,
    interval: Duration,
    lifetime: Duration,
    sender: mpsc::Sender<WatchEvent>,
    signal: StopSignal,
    /// Bootstrapped watermark; classifies Added vs Modified for the whole session
    start: ResourceVersion,
    /// Working watermark W
    current: ResourceVersion,
}

impl<C: SearchClient> WatchSession<C> {
    async fn run(mut self) {
        self.spawn_lifetime_guard();

        match self.poll_until_stopped().await {
            Exit::Failed(err) => {
                self.signal.trigger(StopReason::Failed);
                debug!(session_id = %self.session_id, "Search query error: {}", err);
                self.deliver_terminal(Status::internal_error(&err)).await;
            }
            Exit::Stopped => {
                if self.signal.reason() == Some(StopReason::Expired) {
                    WATCH_SESSIONS_EXPIRED.inc();
                    self.deliver_terminal(Status::expired(self.lifetime)).await;
                }
            }
            Exit::ConsumerGone => {
                self.signal.trigger(StopReason::Finished);
                debug!(session_id = %self.session_id, "Watch consumer went away");
            }
        }

        debug!(
            session_id = %self.session_id,
            resource_version = %self.current,
            "Watcher exited"
        );
        // Dropping `self.sender` closes the channel
    }

    /// Never watch longer than `lifetime`.
    fn spawn_lifetime_guard(&self) {
        let signal = self.signal.clone();
        let lifetime = self.lifetime;
        let session_id = self.session_id.clone();
        let guard = async move {
            tokio::select! {
                biased;
                _ = signal.stopped() => {}
                _ = sleep(lifetime) => {
                    if signal.trigger(StopReason::Expired) {
                        debug!(session_id = %session_id, "maximum duration reached {:?}", lifetime);
                    }
                }
            }
        };
        tokio::spawn(guard.in_current_span());
    }

    async fn poll_until_stopped(&mut self) -> Exit {
        let first_poll_at = self.current.checked_add(self.interval);
        let delay = first_poll_at.map(|t| t.until()).unwrap_or(self.interval);
        debug!(session_id = %self.session_id, "Waiting for minimum interval {:?}", delay);
        if !self.pause(delay).await {
            return Exit::Stopped;
        }

        loop {
            if let Err(exit) = self.poll_once().await {
                return exit;
            }
            if !self.pause(self.interval).await {
                return Exit::Stopped;
            }
        }
    }

    /// Sleeps for `delay`. Returns `false` if the session was stopped first.
    async fn pause(
        &self,
        delay: Duration,
    ) -> bool {
        tokio::select! {
            biased;
            _ = self.signal.stopped() => false,
            _ = sleep(delay) => true,
        }
    }

    async fn poll_once(&mut self) -> Result<(), Exit> {
        let mut args = self.args.clone();
        args.last_change_time = Some(self.current.time());

        let response = tokio::select! {
            biased;
            _ = self.signal.stopped() => return Err(Exit::Stopped),
            r = self.client.search_bugs(args) => r,
        };
        let response = match response {
            Ok(r) => r,
            Err(e) => {
                WATCH_POLLS.with_label_values(&["error"]).inc();
                return Err(Exit::Failed(e));
            }
        };
        let Some(next) = response.latest_change() else {
            WATCH_POLLS.with_label_values(&["empty"]).inc();
            return Ok(());
        };
        if !next.is_after(&self.current) {
            error!(
                session_id = %self.session_id,
                "The resource version for the current query {} is not after {}",
                next,
                self.current
            );
            WATCH_POLLS.with_label_values(&["skipped"]).inc();
            return Ok(());
        }

        let include = &self.include;
        let mut list = BugList::new(response, |b| include(b), self.current);

        debug!(
            session_id = %self.session_id,
            "Watch observed {} bugs with a change time since {}",
            list.len(),
            self.current
        );

        // oldest change first; equal change times fall back to id order
        list.items.sort_by(|a, b| {
            a.last_change_time()
                .cmp(&b.last_change_time())
                .then_with(|| a.id().cmp(&b.id()))
        });
        let mut last_sent: Option<ResourceVersion> = None;
        for bug in list.items {
            // already delivered by an earlier window
            if bug.last_change_time() < self.current.time() {
                continue;
            }
            // A stop may only cut the batch between two change seconds: every
            // delivered bug tells the consumer its whole second has been seen.
            let second = ResourceVersion::new(bug.last_change_time()).truncate();
            let same_second = last_sent == Some(second);

            let event = if bug.creation_timestamp >= self.start.time() {
                WatchEvent::Added(bug)
            } else {
                WatchEvent::Modified(bug)
            };
            trace!(session_id = %self.session_id, "Watch sending {:?}", event);
            if same_second {
                self.deliver(event).await?;
            } else {
                self.send(event).await?;
            }
            last_sent = Some(second);
        }

        self.current = next;
        WATCH_POLLS.with_label_values(&["ok"]).inc();
        Ok(())
    }

    /// Sends unless the session is stopped first.
    async fn send(
        &self,
        event: WatchEvent,
    ) -> Result<(), Exit> {
        tokio::select! {
            biased;
            _ = self.signal.stopped() => Err(Exit::Stopped),
            r = self.deliver(event) => r,
        }
    }

    /// Sends even if the session is stopped. Only a dropped receiver ends
    /// the wait.
    async fn deliver(
        &self,
        event: WatchEvent,
    ) -> Result<(), Exit> {
        let event_type = event.type_name();
        self.sender.send(event).await.map_err(|_| Exit::ConsumerGone)?;
        WATCH_EVENTS.with_label_values(&[event_type]).inc();
        Ok(())
    }

    /// Sends the final `Error` event. Waits for room in the channel; a
    /// consumer that dropped the receiver just loses it.
    async fn deliver_terminal(
        &self,
        status: Status,
    ) {
        debug!(session_id = %self.session_id, ?status, "Watch sending terminal error");
        if self.sender.send(WatchEvent::Error(status)).await.is_ok() {
            WATCH_EVENTS.with_label_values(&["error"]).inc();
        }
    }
}
