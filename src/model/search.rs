use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::BugInfo;
use super::ResourceVersion;

/// Query arguments for the bug search.
///
/// Everything but `last_change_time` is fixed for the lifetime of a watch
/// session; the cutoff advances after every accepted poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchBugsArgs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", rename = "product")]
    pub products: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", rename = "component")]
    pub components: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", rename = "status")]
    pub statuses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quicksearch: Option<String>,
    /// Inclusive "changed since" cutoff, second precision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_change_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchBugsResponse {
    #[serde(default)]
    pub bugs: Vec<BugInfo>,
}

impl SearchBugsResponse {
    /// Most recent change across every returned bug, `None` when empty.
    pub fn latest_change(&self) -> Option<ResourceVersion> {
        self.bugs
            .iter()
            .map(|b| b.last_change_time)
            .max()
            .map(ResourceVersion::new)
    }
}

/// Caller-supplied list/watch options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListOptions {
    /// Resumption token: list anchor, or the watermark a watch resumes from
    #[serde(default)]
    pub resource_version: Option<String>,
    /// Free-form filter hints consumed by the args builder
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl ListOptions {
    pub fn with_resource_version(resource_version: impl Into<String>) -> Self {
        Self {
            resource_version: Some(resource_version.into()),
            ..Default::default()
        }
    }
}
