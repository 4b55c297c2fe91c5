use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use parking_lot::Mutex;

use crate::BugInfo;
use crate::SearchBugsArgs;
use crate::SearchBugsResponse;
use crate::SearchClient;
use crate::TransportError;

/// Search client replaying a fixed sequence of responses, then answering
/// with empty results. Records every query it receives.
#[derive(Debug, Default)]
pub struct ScriptedSearchClient {
    script: Mutex<VecDeque<Result<SearchBugsResponse, TransportError>>>,
    calls: Mutex<Vec<SearchBugsArgs>>,
}

impl ScriptedSearchClient {
    pub fn new(script: Vec<Result<SearchBugsResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Convenience for scripts made only of successful polls
    pub fn with_batches(batches: Vec<Vec<BugInfo>>) -> Arc<Self> {
        Self::new(
            batches
                .into_iter()
                .map(|bugs| Ok(SearchBugsResponse { bugs }))
                .collect(),
        )
    }

    pub fn calls(&self) -> Vec<SearchBugsArgs> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// The `last_change_time` cutoff of every recorded query
    pub fn cutoffs(&self) -> Vec<Option<DateTime<Utc>>> {
        self.calls.lock().iter().map(|a| a.last_change_time).collect()
    }
}

#[async_trait]
impl SearchClient for ScriptedSearchClient {
    async fn search_bugs(
        &self,
        args: SearchBugsArgs,
    ) -> Result<SearchBugsResponse, TransportError> {
        self.calls.lock().push(args);
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(SearchBugsResponse::default()))
    }
}
