//! Build identifiers: a `YYYYMMDDHHMM` UTC minute or the deferred sentinel.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Reserved value meaning "no build has been produced yet".
pub const SENTINEL: &str = "BUILD_TIME_PLACEHOLDER";

const STAMP_FORMAT: &str = "%Y%m%d%H%M";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Identifier of the minute a build artifact was produced.
///
/// A `Stamp` always denotes a real calendar minute, so the ISO-8601 build
/// timestamp can be derived from it without any other input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum BuildId {
    Stamp(DateTime<Utc>),
    Pending,
}

impl BuildId {
    /// Identifier for the minute containing `moment`.
    pub fn from_datetime(moment: DateTime<Utc>) -> Self {
        let minute = moment
            .with_second(0)
            .and_then(|m| m.with_nanosecond(0))
            .unwrap_or(moment);
        Self::Stamp(minute)
    }

    /// Parse either twelve digits naming a valid UTC minute or the sentinel.
    pub fn parse(input: &str) -> Result<Self> {
        if input == SENTINEL {
            return Ok(Self::Pending);
        }

        let malformed = || Error::MalformedBuildId {
            input: input.to_string(),
            sentinel: SENTINEL,
        };

        if input.len() != 12 || !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        let field = |range: std::ops::Range<usize>| -> Result<u32> {
            input[range].parse::<u32>().map_err(|_| malformed())
        };
        let year = input[0..4].parse::<i32>().map_err(|_| malformed())?;
        let moment = NaiveDate::from_ymd_opt(year, field(4..6)?, field(6..8)?)
            .and_then(|date| date.and_hms_opt(field(8..10).ok()?, field(10..12).ok()?, 0))
            .ok_or_else(malformed)?;

        Ok(Self::Stamp(moment.and_utc()))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Stamp(moment) => Some(*moment),
            Self::Pending => None,
        }
    }

    /// ISO-8601 UTC timestamp derived from the identifier.
    pub fn timestamp(&self) -> Option<String> {
        self.datetime()
            .map(|moment| moment.format(TIMESTAMP_FORMAT).to_string())
    }

    /// Whether an ISO-8601 timestamp falls in the same minute as this
    /// identifier. Always false for `Pending`.
    pub fn matches_timestamp(&self, timestamp: &str) -> bool {
        let Some(moment) = self.datetime() else {
            return false;
        };
        DateTime::parse_from_rfc3339(timestamp)
            .map(|parsed| {
                parsed.with_timezone(&Utc).format(STAMP_FORMAT).to_string()
                    == moment.format(STAMP_FORMAT).to_string()
            })
            .unwrap_or(false)
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stamp(moment) => write!(f, "{}", moment.format(STAMP_FORMAT)),
            Self::Pending => f.write_str(SENTINEL),
        }
    }
}

impl FromStr for BuildId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<BuildId> for String {
    fn from(id: BuildId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for BuildId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}
