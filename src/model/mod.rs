//! Data model mirrored from the Bugzilla search API.
mod bug;
mod resource_version;
mod search;

pub use bug::*;
pub use resource_version::*;
pub use search::*;
