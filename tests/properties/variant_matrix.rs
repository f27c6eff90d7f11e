//! Property tests for the variant matrix and coverage arithmetic.

use std::collections::BTreeMap;

use proptest::prelude::*;

use dcfc::diagnostics::DiagnosticReport;
use dcfc::matrix::{enumerate_combinations, evaluate_matrix, MatrixMode, MatrixRule, ValueSpec};
use dcfc::profile::{Profile, ProfileTable};
use dcfc::VariantMatrix;

type Axes = BTreeMap<String, Vec<String>>;

fn any_axes() -> impl Strategy<Value = Axes> {
    proptest::collection::vec(1..=3usize, 1..=3).prop_map(|sizes| {
        sizes
            .into_iter()
            .enumerate()
            .map(|(i, n)| {
                let values = (0..n).map(|v| format!("v{v}")).collect();
                (format!("axis{i}"), values)
            })
            .collect()
    })
}

// Rules constrain a subset of the declared axes to declared values.
fn any_rules(axes: Axes) -> impl Strategy<Value = Vec<MatrixRule>> {
    let axis_list: Vec<(String, usize)> = axes
        .iter()
        .map(|(name, values)| (name.clone(), values.len()))
        .collect();
    proptest::collection::vec(
        proptest::collection::vec(any::<proptest::sample::Index>(), 1..=axis_list.len()),
        0..=3,
    )
    .prop_map(move |rule_specs| {
        rule_specs
            .into_iter()
            .map(|picks| {
                let mut rule = MatrixRule::new();
                for pick in picks {
                    let (name, len) = &axis_list[pick.index(axis_list.len())];
                    let value = format!("v{}", pick.index(*len));
                    rule.insert(name.clone(), ValueSpec::One(value));
                }
                rule
            })
            .collect()
    })
}

fn any_mode() -> impl Strategy<Value = MatrixMode> {
    prop_oneof![
        Just(MatrixMode::All),
        Just(MatrixMode::Allowlist),
        Just(MatrixMode::Blocklist),
    ]
}

fn any_matrix() -> impl Strategy<Value = (Axes, VariantMatrix)> {
    any_axes().prop_flat_map(|axes| {
        let allow = any_rules(axes.clone());
        let deny = any_rules(axes.clone());
        (Just(axes), any_mode(), allow, deny).prop_map(|(axes, mode, allow, deny)| {
            (
                axes,
                VariantMatrix {
                    mode,
                    allow,
                    deny,
                    fallback: BTreeMap::new(),
                },
            )
        })
    })
}

fn lite() -> ProfileTable {
    ProfileTable::for_profile(Profile::Lite)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: valid + invalid always equals the full cartesian
    /// product, which equals the product of the axis sizes.
    #[test]
    fn property_coverage_arithmetic_holds((axes, matrix) in any_matrix()) {
        let mut report = DiagnosticReport::new();
        let coverage = evaluate_matrix("C", &axes, Some(&matrix), &lite(), &mut report);

        let product: usize = axes.values().map(Vec::len).product();
        prop_assert_eq!(coverage.total_combinations, product);
        prop_assert_eq!(
            coverage.valid_combinations + coverage.invalid_combinations,
            coverage.total_combinations
        );

        let expected = if product == 0 {
            1.0
        } else {
            coverage.valid_combinations as f64 / product as f64
        };
        prop_assert!((coverage.coverage - expected).abs() < 1e-9);
    }

    /// PROPERTY: A combination matched by any deny rule is invalid no
    /// matter the mode or the allow rules.
    #[test]
    fn property_deny_overrides_everything((axes, matrix) in any_matrix()) {
        for combination in enumerate_combinations(&axes) {
            let denied = matrix.deny.iter().any(|rule| {
                rule.iter().all(|(axis, spec)| {
                    combination
                        .get(axis)
                        .map(|v| spec == &ValueSpec::One(v.clone()))
                        .unwrap_or(false)
                })
            });
            if denied {
                prop_assert!(
                    !matrix.is_valid(&combination),
                    "denied combination {combination:?} reported valid under {:?}",
                    matrix.mode
                );
            }
        }
    }

    /// PROPERTY: Without deny rules, mode `all` accepts every
    /// combination and coverage is total.
    #[test]
    fn property_mode_all_is_full_coverage(axes in any_axes()) {
        let matrix = VariantMatrix::default();
        let mut report = DiagnosticReport::new();
        let coverage = evaluate_matrix("C", &axes, Some(&matrix), &lite(), &mut report);

        prop_assert_eq!(coverage.invalid_combinations, 0);
        prop_assert!((coverage.coverage - 1.0).abs() < 1e-9);
    }

    /// PROPERTY: Allowlist mode never accepts more than blocklist mode
    /// with the same rules.
    #[test]
    fn property_allowlist_is_no_looser_than_blocklist((axes, matrix) in any_matrix()) {
        let allowlist = VariantMatrix {
            mode: MatrixMode::Allowlist,
            ..matrix.clone()
        };
        let blocklist = VariantMatrix {
            mode: MatrixMode::Blocklist,
            ..matrix
        };

        for combination in enumerate_combinations(&axes) {
            if allowlist.is_valid(&combination) {
                prop_assert!(blocklist.is_valid(&combination));
            }
        }
    }
}
