use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::constants::BUG_RESOURCE;
use crate::Bug;
use crate::Error;
use crate::Result;
use crate::WatchEvent;

/// Thread-safe bug cache keyed by `Bug::name`
#[derive(Debug, Default)]
pub struct BugStore {
    // name -> Bug
    items: DashMap<String, Bug>,
}

impl BugStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the store hold exactly `items`.
    ///
    /// Keys absent from `items` are removed first, then every item is
    /// written. Readers never observe an empty store during a relist.
    pub fn replace(
        &self,
        items: Vec<Bug>,
    ) {
        let keep: HashSet<&str> = items.iter().map(|b| b.name.as_str()).collect();
        self.items.retain(|name, _| keep.contains(name.as_str()));

        let count = items.len();
        for bug in items {
            self.items.insert(bug.name.clone(), bug);
        }
        trace!(count, "Store replaced");
    }

    /// Inserts or overwrites, returning the previous entry.
    pub fn upsert(
        &self,
        bug: Bug,
    ) -> Option<Bug> {
        self.items.insert(bug.name.clone(), bug)
    }

    /// Applies a watch event. Returns `true` if the store changed.
    ///
    /// A bug whose last change time is older than the cached entry is
    /// ignored. Error events never touch the store.
    pub fn apply(
        &self,
        event: &WatchEvent,
    ) -> bool {
        let Some(bug) = event.bug() else {
            return false;
        };

        if let Some(mut entry) = self.items.get_mut(&bug.name) {
            if entry.last_change_time() > bug.last_change_time() {
                trace!(name = %bug.name, "Ignoring stale {}", event.type_name());
                return false;
            }
            *entry.value_mut() = bug.clone();
            return true;
        }

        self.items.insert(bug.name.clone(), bug.clone());
        true
    }

    pub fn get_by_key(
        &self,
        key: &str,
    ) -> Option<Bug> {
        self.items.get(key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.items.iter().map(|entry| entry.key().clone()).collect()
    }
}

/// Read-only lookups over a shared `BugStore`
#[derive(Debug, Clone)]
pub struct BugLister {
    store: Arc<BugStore>,
}

impl BugLister {
    pub fn new(store: Arc<BugStore>) -> Self {
        Self { store }
    }

    /// # Errors
    /// `Error::NotFound` when the bug is not cached.
    pub fn get(
        &self,
        id: u64,
    ) -> Result<Bug> {
        let name = id.to_string();
        self.store.get_by_key(&name).ok_or(Error::NotFound {
            resource: BUG_RESOURCE,
            name,
        })
    }

    /// Every cached bug accepted by `predicate`, ordered by id.
    pub fn list(
        &self,
        predicate: impl Fn(&Bug) -> bool,
    ) -> Vec<Bug> {
        let mut bugs: Vec<Bug> = self
            .store
            .items
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        bugs.sort_by_key(|b| b.id());
        bugs
    }
}
