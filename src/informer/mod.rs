//! Keeps a `BugStore` in sync with the remote search.
//!
//! ```text
//! list (with backoff) ──> store.replace ──> watch(rv)
//!                                             │
//!                  Added / Modified ──> store.apply, rv = max(rv, item rv)
//!                  Error(Expired) or closed ──> watch(rv) again
//!                  Error(InternalError) ──> list again
//! ```
mod informer;

pub use informer::*;
