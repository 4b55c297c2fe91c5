use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::ResourceVersion;
use super::SearchBugsResponse;

/// A bug as returned by the Bugzilla search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugInfo {
    pub id: u64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub resolution: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub component: Vec<String>,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub assigned_to: String,
    pub creation_time: DateTime<Utc>,
    pub last_change_time: DateTime<Utc>,
}

/// Local mirror of a remote bug, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    /// Decimal bug id, the cache key
    pub name: String,
    pub creation_timestamp: DateTime<Utc>,
    /// Last change time of this bug, formatted as a resource version
    pub resource_version: String,
    pub info: BugInfo,
}

impl Bug {
    pub fn id(&self) -> u64 {
        self.info.id
    }

    pub fn last_change_time(&self) -> DateTime<Utc> {
        self.info.last_change_time
    }
}

impl From<BugInfo> for Bug {
    fn from(info: BugInfo) -> Self {
        Self {
            name: info.id.to_string(),
            creation_timestamp: info.creation_time,
            resource_version: ResourceVersion::new(info.last_change_time).to_string(),
            info,
        }
    }
}

/// A point-in-time collection of bugs and the watermark it reflects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BugList {
    pub resource_version: String,
    pub items: Vec<Bug>,
}

impl BugList {
    /// Builds a list from a search response, keeping only bugs accepted by
    /// `include`.
    ///
    /// The resource version is the most recent change time across every bug
    /// in the response, included or not, so hidden changes still advance the
    /// watermark. An empty response reports `anchor`.
    pub fn new(
        response: SearchBugsResponse,
        include: impl Fn(&BugInfo) -> bool,
        anchor: ResourceVersion,
    ) -> Self {
        let resource_version = response.latest_change().unwrap_or(anchor);

        let items = response
            .bugs
            .into_iter()
            .filter(|b| include(b))
            .map(Bug::from)
            .collect();

        Self {
            resource_version: resource_version.to_string(),
            items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
