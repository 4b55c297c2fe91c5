use std::fmt;
use std::time::Duration;

use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::SubsecRound;
use chrono::TimeDelta;
use chrono::Utc;

use crate::ParseError;

/// Time-derived watermark: "every change up to and including this instant
/// has been observed".
///
/// The search API filters at whole-second precision, so the token is always
/// formatted at second resolution and parse/format round-trips without loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceVersion(DateTime<Utc>);

impl ResourceVersion {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self(time)
    }

    /// Parses an RFC 3339 token. An empty token denotes the beginning of time.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        if value.is_empty() {
            return Ok(Self(DateTime::<Utc>::default()));
        }
        DateTime::parse_from_rfc3339(value)
            .map(|t| Self(t.with_timezone(&Utc)))
            .map_err(|source| ParseError::ResourceVersion {
                value: value.to_string(),
                source,
            })
    }

    /// Current wall clock, truncated to whole seconds.
    pub fn now() -> Self {
        Self(Utc::now()).truncate()
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.0
    }

    pub fn truncate(&self) -> Self {
        Self(self.0.trunc_subsecs(0))
    }

    /// The first instant a query can observe that this watermark has not
    /// already covered: the cutoff is inclusive at one-second precision.
    pub fn next_visible(&self) -> Self {
        Self(self.truncate().0 + TimeDelta::seconds(1))
    }

    pub fn is_after(
        &self,
        other: &ResourceVersion,
    ) -> bool {
        self.0 > other.0
    }

    /// `self + interval`, or `None` on overflow.
    pub fn checked_add(
        &self,
        interval: Duration,
    ) -> Option<Self> {
        let delta = TimeDelta::from_std(interval).ok()?;
        self.0.checked_add_signed(delta).map(Self)
    }

    /// How long from now until this instant; zero if already passed.
    pub fn until(&self) -> Duration {
        (self.0 - Utc::now()).to_std().unwrap_or(Duration::ZERO)
    }
}

impl fmt::Display for ResourceVersion {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

impl From<DateTime<Utc>> for ResourceVersion {
    fn from(time: DateTime<Utc>) -> Self {
        Self(time)
    }
}
