use proptest::prelude::*;
use verstamp_content::{BuildId, SemanticVersion};

proptest! {
    #[test]
    fn canonical_versions_always_parse(major in 0u64..100_000, minor in 0u64..100_000, patch in 0u64..100_000) {
        let rendered = format!("{major}.{minor}.{patch}");
        let parsed = SemanticVersion::parse(&rendered).unwrap();
        prop_assert_eq!(parsed, SemanticVersion::new(major, minor, patch));
        prop_assert_eq!(parsed.to_string(), rendered);
    }

    #[test]
    fn strings_outside_the_shape_never_parse(s in "\\PC*") {
        let shaped = s.split('.').count() == 3
            && s.split('.').all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
        if !shaped {
            prop_assert!(SemanticVersion::parse(&s).is_err());
        }
    }

    #[test]
    fn stamps_round_trip_through_text(
        year in 2000i32..2100,
        month in 1u32..=12,
        day in 1u32..=28,
        hour in 0u32..24,
        minute in 0u32..60,
    ) {
        let text = format!("{year:04}{month:02}{day:02}{hour:02}{minute:02}");
        let id = BuildId::parse(&text).unwrap();
        prop_assert_eq!(id.to_string(), text);
        let timestamp = id.timestamp().unwrap();
        prop_assert!(id.matches_timestamp(&timestamp));
    }
}
