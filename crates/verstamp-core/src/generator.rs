//! Build identifier generation

use chrono::{DateTime, Utc};
use verstamp_content::BuildId;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock, in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// How a pass obtains its build identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildIdGenerator {
    /// Stamp the current UTC minute
    Immediate,
    /// Leave the sentinel for a later `inject`
    Deferred,
}

impl BuildIdGenerator {
    /// Two immediate identifiers generated within the same minute are equal.
    pub fn generate(&self, clock: &dyn Clock) -> BuildId {
        match self {
            Self::Immediate => BuildId::from_datetime(clock.now()),
            Self::Deferred => BuildId::Pending,
        }
    }
}
