use std::sync::Arc;

use tracing::debug;

use crate::BugInfo;
use crate::BugList;
use crate::IncludeFn;
use crate::ListOptions;
use crate::PeriodicWatcher;
use crate::ResourceVersion;
use crate::Result;
use crate::SearchBugsArgs;
use crate::SearchClient;
use crate::WatchConfig;

/// Maps caller options to the search query.
pub type ArgsFn = Arc<dyn Fn(&ListOptions) -> SearchBugsArgs + Send + Sync>;

pub struct ListWatcher<C> {
    client: Arc<C>,
    args_fn: ArgsFn,
    include_fn: IncludeFn,
    config: WatchConfig,
}

impl<C> Clone for ListWatcher<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            args_fn: self.args_fn.clone(),
            include_fn: self.include_fn.clone(),
            config: self.config.clone(),
        }
    }
}

impl<C> std::fmt::Debug for ListWatcher<C> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ListWatcher").field("config", &self.config).finish()
    }
}

impl<C: SearchClient> ListWatcher<C> {
    /// Searches every bug and surfaces all of them until `with_args_fn` and
    /// `with_include_fn` say otherwise.
    pub fn new(
        client: Arc<C>,
        config: WatchConfig,
    ) -> Self {
        Self {
            client,
            args_fn: Arc::new(|_: &ListOptions| SearchBugsArgs::default()),
            include_fn: Arc::new(|_: &BugInfo| true),
            config,
        }
    }

    pub fn with_args_fn(
        mut self,
        args_fn: impl Fn(&ListOptions) -> SearchBugsArgs + Send + Sync + 'static,
    ) -> Self {
        self.args_fn = Arc::new(args_fn);
        self
    }

    pub fn with_include_fn(
        mut self,
        include_fn: impl Fn(&BugInfo) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.include_fn = Arc::new(include_fn);
        self
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// One search with the caller's filters and no change-time cutoff.
    ///
    /// An empty result reports the options' resource version, or the current
    /// time when the caller supplied none.
    ///
    /// # Errors
    /// - `Error::Parse` for a malformed resource version in `options`
    /// - `Error::Transport` when the search fails
    pub async fn list(
        &self,
        options: &ListOptions,
    ) -> Result<BugList> {
        let anchor = match options.resource_version.as_deref() {
            Some(rv) if !rv.is_empty() => ResourceVersion::parse(rv)?,
            _ => ResourceVersion::now(),
        };

        let response = self.client.search_bugs((self.args_fn)(options)).await?;
        let list = BugList::new(response, |b| (self.include_fn)(b), anchor);
        debug!(
            resource_version = %list.resource_version,
            items = list.len(),
            "Listed bugs"
        );
        Ok(list)
    }

    /// Starts a watch session resuming after `options.resource_version`.
    ///
    /// A missing or empty resource version watches from the beginning of
    /// time.
    ///
    /// # Errors
    /// Returns `Error::Parse` if the resource version is malformed. Nothing
    /// is spawned in that case.
    pub fn watch(
        &self,
        options: &ListOptions,
    ) -> Result<PeriodicWatcher> {
        let resource_version =
            ResourceVersion::parse(options.resource_version.as_deref().unwrap_or_default())?;

        Ok(PeriodicWatcher::start(
            self.client.clone(),
            (self.args_fn)(options),
            self.include_fn.clone(),
            resource_version,
            &self.config,
        ))
    }
}
