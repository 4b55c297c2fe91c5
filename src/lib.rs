//! List/watch emulation over the Bugzilla bug search API.
//!
//! Bugzilla has no change feed, only "search bugs changed since T". This
//! crate turns that into what a cache-backed controller expects:
//!
//! - [`ListWatcher::list`]: a snapshot plus the resource version it reflects
//! - [`ListWatcher::watch`]: an ordered stream of `Added`/`Modified` events
//!   after a resource version, produced by a bounded-lifetime
//!   [`PeriodicWatcher`] session
//! - [`Informer`]: list, watch, resume and relist into a [`BugStore`], read
//!   through a [`BugLister`]
//!
//! The remote call is abstracted by [`SearchClient`]; plug in any HTTP
//! client.
//!
//! ```ignore
//! let config = InformerConfig::new()?.validate()?;
//! let list_watcher = ListWatcher::new(client, config.watch.clone())
//!     .with_args_fn(|_| SearchBugsArgs {
//!         products: vec!["OpenShift Container Platform".to_string()],
//!         ..Default::default()
//!     })
//!     .with_include_fn(|bug| bug.status != "CLOSED");
//! let informer = Arc::new(Informer::new(list_watcher, config.retry.list));
//!
//! let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(());
//! tokio::spawn({
//!     let informer = informer.clone();
//!     async move { informer.run(shutdown_rx).await }
//! });
//! ```

mod cache;
mod client;
mod config;
mod constants;
mod errors;
mod informer;
mod list_watcher;
mod model;
mod watch;

pub mod metrics;
pub(crate) mod utils;

pub use cache::*;
pub use client::*;
pub use config::*;
pub use constants::STATUS_CODE_EXPIRED;
pub use constants::STATUS_CODE_INTERNAL_ERROR;
pub use errors::*;
pub use informer::*;
pub use list_watcher::*;
pub use model::*;
pub use watch::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
