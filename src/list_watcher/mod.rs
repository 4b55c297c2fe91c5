//! Snapshot listing and watch construction over one search client.
//!
//! A `ListWatcher` is the only place that turns caller options into search
//! arguments. `list` answers "what exists now", `watch` answers "what changed
//! after this resource version".
mod list_watcher;

pub use list_watcher::*;

#[cfg(test)]
mod list_watcher_test;
