use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::metrics::INFORMER_CYCLES;
use crate::utils::async_task::task_with_timeout_and_exponential_backoff;
use crate::BackoffPolicy;
use crate::BugList;
use crate::BugLister;
use crate::BugStore;
use crate::ListOptions;
use crate::ListWatcher;
use crate::ResourceVersion;
use crate::Result;
use crate::SearchClient;
use crate::WatchEvent;

/// What to do once a watch session ends
#[derive(Debug, PartialEq, Eq)]
enum Next {
    Rewatch,
    Relist,
    Shutdown,
}

pub struct Informer<C> {
    list_watcher: ListWatcher<C>,
    options: ListOptions,
    retry: BackoffPolicy,
    store: Arc<BugStore>,
    synced: AtomicBool,
}

impl<C: SearchClient> Informer<C> {
    /// `retry` bounds every list attempt, including relists after a failed
    /// watch.
    pub fn new(
        list_watcher: ListWatcher<C>,
        retry: BackoffPolicy,
    ) -> Self {
        Self {
            list_watcher,
            options: ListOptions::default(),
            retry,
            store: Arc::new(BugStore::new()),
            synced: AtomicBool::new(false),
        }
    }

    /// Labels handed to the args builder on every list and watch. Any
    /// resource version in `options` is ignored.
    pub fn with_options(
        mut self,
        options: ListOptions,
    ) -> Self {
        self.options = ListOptions {
            resource_version: None,
            labels: options.labels,
        };
        self
    }

    pub fn store(&self) -> Arc<BugStore> {
        self.store.clone()
    }

    pub fn lister(&self) -> BugLister {
        BugLister::new(self.store.clone())
    }

    /// True once the first list has been written to the store.
    pub fn has_synced(&self) -> bool {
        self.synced.load(Ordering::Acquire)
    }

    /// Lists, then watches until `shutdown_signal` fires or its sender is
    /// dropped.
    ///
    /// Relists after a failed watch are spaced by the `retry` backoff, reset
    /// once a watch ends normally.
    ///
    /// # Errors
    /// Returns the last list error once `retry` is exhausted, or a parse error
    /// if a listed resource version is malformed.
    pub async fn run(
        &self,
        mut shutdown_signal: watch::Receiver<()>,
    ) -> Result<()> {
        // Consecutive relists caused by failed watches
        let mut relists: u32 = 0;
        loop {
            let list = tokio::select! {
                biased;
                _ = shutdown_signal.changed() => {
                    info!("[Informer] shutdown signal received.");
                    return Ok(());
                }
                list = self.list() => list?,
            };

            let mut resource_version = ResourceVersion::parse(&list.resource_version)?;
            debug!(
                resource_version = %resource_version,
                items = list.len(),
                "Replacing store"
            );
            self.store.replace(list.items);
            self.synced.store(true, Ordering::Release);

            loop {
                match self.watch_until_closed(&mut resource_version, &mut shutdown_signal).await? {
                    Next::Rewatch => {
                        relists = 0;
                        INFORMER_CYCLES.with_label_values(&["rewatch"]).inc();
                        debug!(resource_version = %resource_version, "Resuming watch");
                    }
                    Next::Relist => break,
                    Next::Shutdown => return Ok(()),
                }
            }

            let delay = self.retry.delay(relists);
            relists = relists.saturating_add(1);
            debug!(attempt = relists, "Relisting in {:?}", delay);
            tokio::select! {
                biased;
                _ = shutdown_signal.changed() => {
                    info!("[Informer] shutdown signal received.");
                    return Ok(());
                }
                _ = sleep(delay) => {}
            }
        }
    }

    async fn list(&self) -> Result<BugList> {
        INFORMER_CYCLES.with_label_values(&["list"]).inc();
        let list_watcher = &self.list_watcher;
        let options = &self.options;
        task_with_timeout_and_exponential_backoff(move || list_watcher.list(options), self.retry).await
    }

    /// Applies one session's events to the store, advancing
    /// `resource_version` to the newest item seen.
    async fn watch_until_closed(
        &self,
        resource_version: &mut ResourceVersion,
        shutdown_signal: &mut watch::Receiver<()>,
    ) -> Result<Next> {
        let options = ListOptions {
            resource_version: Some(resource_version.to_string()),
            labels: self.options.labels.clone(),
        };
        let mut watcher = self.list_watcher.watch(&options)?;

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown_signal.changed() => {
                    let discarded = watcher.stop_and_drain().await;
                    info!(discarded, "[Informer] shutdown signal received.");
                    return Ok(Next::Shutdown);
                }
                event = watcher.recv() => event,
            };

            match event {
                None => return Ok(Next::Rewatch),
                Some(WatchEvent::Error(status)) if status.is_resumable() => {
                    return Ok(Next::Rewatch);
                }
                Some(WatchEvent::Error(status)) => {
                    warn!(code = status.code, "Watch failed, relisting: {}", status.message);
                    return Ok(Next::Relist);
                }
                Some(event) => {
                    if let Some(bug) = event.bug() {
                        let rv = ResourceVersion::new(bug.last_change_time());
                        if rv.is_after(resource_version) {
                            *resource_version = rv;
                        }
                    }
                    self.store.apply(&event);
                }
            }
        }
    }
}
