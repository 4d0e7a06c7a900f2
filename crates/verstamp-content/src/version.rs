//! Semantic version parsing and arithmetic.
//!
//! Only the bare `MAJOR.MINOR.PATCH` shape is accepted: no `v` prefix, no
//! pre-release or build metadata, no surrounding whitespace. The shape is
//! checked with a regex first, then the components are handed to `semver`,
//! which also rejects leading zeros and components that overflow `u64`.
//!
//! ```
//! use verstamp_content::{ChangeKind, SemanticVersion};
//!
//! let version: SemanticVersion = "2.9.9".parse().unwrap();
//! assert_eq!(version.bump(ChangeKind::Minor).unwrap().to_string(), "2.10.0");
//! assert!("2.9".parse::<SemanticVersion>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

static SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("Invalid semantic version regex"));

/// Which component of a version changes.
///
/// Used both to request a bump and to classify the difference between two
/// versions. `Build` leaves the semantic version untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Major,
    Minor,
    Patch,
    Build,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Build => "build",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            "build" => Ok(Self::Build),
            other => Err(format!(
                "unknown change kind '{other}' (expected major, minor, patch or build)"
            )),
        }
    }
}

/// A `MAJOR.MINOR.PATCH` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version, rejecting anything but the three-integer shape.
    pub fn parse(input: &str) -> Result<Self> {
        let malformed = |reason: &str| Error::MalformedVersion {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if !SHAPE.is_match(input) {
            return Err(malformed("expected MAJOR.MINOR.PATCH"));
        }
        if input
            .split('.')
            .any(|component| component.len() > 1 && component.starts_with('0'))
        {
            return Err(malformed("leading zeros are not allowed"));
        }
        let parsed = semver::Version::parse(input)
            .map_err(|_| malformed("component does not fit in 64 bits"))?;
        Ok(Self::new(parsed.major, parsed.minor, parsed.patch))
    }

    /// Apply one bump. Lower components reset to zero.
    pub fn bump(self, kind: ChangeKind) -> Result<Self> {
        let overflow = || Error::MalformedVersion {
            input: format!("{self} bumped by {kind}"),
            reason: "component does not fit in 64 bits".to_string(),
        };
        let bumped = match kind {
            ChangeKind::Major => Self::new(self.major.checked_add(1).ok_or_else(overflow)?, 0, 0),
            ChangeKind::Minor => Self::new(
                self.major,
                self.minor.checked_add(1).ok_or_else(overflow)?,
                0,
            ),
            ChangeKind::Patch => Self::new(
                self.major,
                self.minor,
                self.patch.checked_add(1).ok_or_else(overflow)?,
            ),
            ChangeKind::Build => self,
        };
        Ok(bumped)
    }

    /// Components in significance order.
    pub fn components(&self) -> [(ChangeKind, u64); 3] {
        [
            (ChangeKind::Major, self.major),
            (ChangeKind::Minor, self.minor),
            (ChangeKind::Patch, self.patch),
        ]
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemanticVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<SemanticVersion> for String {
    fn from(version: SemanticVersion) -> Self {
        version.to_string()
    }
}

impl TryFrom<String> for SemanticVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SemanticVersion> for semver::Version {
    fn from(version: SemanticVersion) -> Self {
        semver::Version::new(version.major, version.minor, version.patch)
    }
}
