//! Informer Error Hierarchy
//!
//! Defines the error types surfaced by the list/watch emulation layer,
//! categorized by where the failure originates: the remote search call,
//! resumption token parsing, configuration, and the local cache.

use std::time::Duration;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Remote search call failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Malformed resumption token or response watermark
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Configuration loading failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration validation failures
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Lookup of a key absent from the local cache
    #[error("{resource} \"{name}\" not found")]
    NotFound { resource: &'static str, name: String },

    /// Retry policy exhaustion on a single attempt timeout
    #[error("Retry timeout after {0:?}")]
    RetryTimeout(Duration),

    #[error("{0}")]
    RetryTaskFailed(String),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The search request was sent but the server rejected or failed it
    #[error("Search request failed: {0}")]
    Request(String),

    /// No response within the client's deadline
    #[error("Search request timed out after {0:?}")]
    Timeout(Duration),

    /// Endpoint unavailable (HTTP 503 equivalent)
    #[error("Search service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("invalid resource version {value:?}: {source}")]
    ResourceVersion {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl Error {
    /// True when the error is a cache miss rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
