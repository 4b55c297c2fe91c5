use chrono::DateTime;
use chrono::TimeDelta;
use chrono::TimeZone;
use chrono::Utc;

use crate::BugInfo;
use crate::ResourceVersion;

/// Fixed reference instant, safely in the past so no session throttles on it.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// `t0() + secs`
pub fn at(secs: i64) -> DateTime<Utc> {
    t0() + TimeDelta::seconds(secs)
}

pub fn rv_at(secs: i64) -> ResourceVersion {
    ResourceVersion::new(at(secs))
}

pub fn bug_info(
    id: u64,
    creation_time: DateTime<Utc>,
    last_change_time: DateTime<Utc>,
) -> BugInfo {
    BugInfo {
        id,
        summary: format!("bug {id}"),
        status: "NEW".to_string(),
        resolution: String::new(),
        product: "OpenShift Container Platform".to_string(),
        component: vec!["Networking".to_string()],
        severity: "medium".to_string(),
        priority: "medium".to_string(),
        assigned_to: "nobody@example.com".to_string(),
        creation_time,
        last_change_time,
    }
}
