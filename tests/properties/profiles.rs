//! Property tests for the profile strictness table.

use proptest::prelude::*;

use dcfc::diagnostics::DiagnosticReport;
use dcfc::profile::{CheckCategory, Profile, ProfileTable, Strictness};

fn any_profile() -> impl Strategy<Value = Profile> {
    prop_oneof![
        Just(Profile::Lite),
        Just(Profile::Standard),
        Just(Profile::Strict),
    ]
}

fn any_category() -> impl Strategy<Value = CheckCategory> {
    prop_oneof![
        Just(CheckCategory::MissingRequired),
        Just(CheckCategory::UndefinedToken),
        Just(CheckCategory::IncompleteVariant),
        Just(CheckCategory::Accessibility),
    ]
}

fn rank(s: Strictness) -> u8 {
    match s {
        Strictness::Skip => 0,
        Strictness::Warn => 1,
        Strictness::Error => 2,
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: A higher tier never relaxes a verdict: for any
    /// category, lite <= standard <= strict.
    #[test]
    fn property_strictness_is_monotone(
        category in any_category(),
        a in any_profile(),
        b in any_profile(),
    ) {
        let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
        let lower_verdict = ProfileTable::for_profile(lower).strictness(category);
        let upper_verdict = ProfileTable::for_profile(upper).strictness(category);
        prop_assert!(
            rank(lower_verdict) <= rank(upper_verdict),
            "{category:?} relaxed from {lower:?} ({lower_verdict:?}) to {upper:?} ({upper_verdict:?})"
        );
    }

    /// PROPERTY: Anything reported as an error under some tier is still
    /// an error under every higher tier.
    #[test]
    fn property_errors_survive_escalation(
        category in any_category(),
        a in any_profile(),
        b in any_profile(),
    ) {
        let (lower, upper) = if a <= b { (a, b) } else { (b, a) };

        let mut lower_report = DiagnosticReport::new();
        ProfileTable::for_profile(lower).report(
            category,
            &mut lower_report,
            "doc",
            "SomeRule",
            "finding",
        );

        if lower_report.errors() > 0 {
            let mut upper_report = DiagnosticReport::new();
            ProfileTable::for_profile(upper).report(
                category,
                &mut upper_report,
                "doc",
                "SomeRule",
                "finding",
            );
            prop_assert_eq!(upper_report.errors(), 1);
        }
    }

    /// PROPERTY: Routing a finding emits at most one diagnostic, and its
    /// severity matches the table verdict exactly.
    #[test]
    fn property_report_matches_table(
        category in any_category(),
        profile in any_profile(),
    ) {
        let table = ProfileTable::for_profile(profile);
        let mut report = DiagnosticReport::new();
        table.report(category, &mut report, "doc", "SomeRule", "finding");

        match table.strictness(category) {
            Strictness::Skip => prop_assert!(report.diagnostics.is_empty()),
            Strictness::Warn => {
                prop_assert_eq!(report.warnings(), 1);
                prop_assert_eq!(report.errors(), 0);
            }
            Strictness::Error => prop_assert_eq!(report.errors(), 1),
        }
    }
}
