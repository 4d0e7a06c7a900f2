//! Release advisories from a version change

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use verstamp_content::{ChangeKind, SemanticVersion};

/// Whether the new version sorts after the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upgrade,
    Same,
    Downgrade,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upgrade => "upgrade",
            Self::Same => "same",
            Self::Downgrade => "downgrade",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Ordering> for Direction {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Self::Upgrade,
            Ordering::Equal => Self::Same,
            Ordering::Greater => Self::Downgrade,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub old: SemanticVersion,
    pub new: SemanticVersion,
    pub kind: ChangeKind,
    /// A release is recommended only for major changes
    pub release_advised: bool,
    pub direction: Direction,
}

/// Classify a change by the first component that differs, left to right.
///
/// Equal versions classify as [`ChangeKind::Build`].
pub fn classify(old: &SemanticVersion, new: &SemanticVersion) -> Classification {
    let kind = old
        .components()
        .into_iter()
        .zip(new.components())
        .find(|((_, a), (_, b))| a != b)
        .map(|((kind, _), _)| kind)
        .unwrap_or(ChangeKind::Build);

    let ordering = semver::Version::from(*old).cmp(&semver::Version::from(*new));

    Classification {
        old: *old,
        new: *new,
        kind,
        release_advised: kind == ChangeKind::Major,
        direction: ordering.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.2.3", "2.0.0", ChangeKind::Major, true, Direction::Upgrade)]
    #[case("1.2.3", "1.3.0", ChangeKind::Minor, false, Direction::Upgrade)]
    #[case("1.2.3", "1.2.4", ChangeKind::Patch, false, Direction::Upgrade)]
    #[case("1.2.3", "1.2.3", ChangeKind::Build, false, Direction::Same)]
    #[case("2.0.0", "1.9.9", ChangeKind::Major, true, Direction::Downgrade)]
    #[case("2.9.9", "2.10.0", ChangeKind::Minor, false, Direction::Upgrade)]
    fn classifies_first_differing_component(
        #[case] old: &str,
        #[case] new: &str,
        #[case] kind: ChangeKind,
        #[case] release_advised: bool,
        #[case] direction: Direction,
    ) {
        let classification = classify(
            &SemanticVersion::parse(old).unwrap(),
            &SemanticVersion::parse(new).unwrap(),
        );
        assert_eq!(classification.kind, kind);
        assert_eq!(classification.release_advised, release_advised);
        assert_eq!(classification.direction, direction);
    }
}
