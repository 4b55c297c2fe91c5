//! Boundary to the remote Bugzilla search API.
//!
//! The informer only needs "give me every bug matching these filters that
//! changed since T". Transport, authentication and pagination are the
//! implementor's concern.

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;

use crate::SearchBugsArgs;
use crate::SearchBugsResponse;
use crate::TransportError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SearchClient: Send + Sync + 'static {
    /// Runs one bulk search.
    ///
    /// `args.last_change_time`, when set, is an inclusive lower bound at
    /// second precision. The call must be idempotent and safe to repeat at
    /// arbitrary intervals.
    ///
    /// # Errors
    /// Returns `TransportError` if the request could not be completed.
    async fn search_bugs(
        &self,
        args: SearchBugsArgs,
    ) -> Result<SearchBugsResponse, TransportError>;
}
