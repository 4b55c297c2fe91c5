//! Local mirror of watched bugs.
//!
//! `BugStore` is the write side, fed by the informer. `BugLister` is the
//! read-only view handed to consumers.
mod bug_store;

pub use bug_store::*;

#[cfg(test)]
mod bug_store_test;
