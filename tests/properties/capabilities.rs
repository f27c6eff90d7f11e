//! Property tests for capability closure.

use std::collections::BTreeMap;

use proptest::prelude::*;

use dcfc::capability::{Capability, CapabilitySet};
use dcfc::diagnostics::DiagnosticReport;

fn any_declaration() -> impl Strategy<Value = BTreeMap<Capability, bool>> {
    proptest::collection::vec(proptest::option::of(any::<bool>()), 8).prop_map(|flags| {
        Capability::ALL
            .iter()
            .zip(flags)
            .filter_map(|(cap, flag)| flag.map(|on| (*cap, on)))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: After closure, every enabled layer has all of its
    /// dependencies enabled; there are no dangling requirements.
    #[test]
    fn property_closure_satisfies_dependencies(declared in any_declaration()) {
        let mut report = DiagnosticReport::new();
        let set = CapabilitySet::from_declared(&declared, "doc", &mut report);

        for cap in Capability::ALL {
            if set.is_enabled(cap) {
                for dep in cap.requires() {
                    prop_assert!(
                        set.is_enabled(*dep),
                        "{cap:?} enabled but dependency {dep:?} is not"
                    );
                }
            }
        }
    }

    /// PROPERTY: Closure is idempotent: re-declaring the closed set and
    /// closing again yields the same set, with no new warnings.
    #[test]
    fn property_closure_is_idempotent(declared in any_declaration()) {
        let mut report = DiagnosticReport::new();
        let first = CapabilitySet::from_declared(&declared, "doc", &mut report);

        let redeclared: BTreeMap<Capability, bool> = Capability::ALL
            .iter()
            .map(|c| (*c, first.is_enabled(*c)))
            .collect();

        let mut second_report = DiagnosticReport::new();
        let second = CapabilitySet::from_declared(&redeclared, "doc", &mut second_report);

        prop_assert_eq!(first.enabled_layers(), second.enabled_layers());
        prop_assert!(second_report.diagnostics.is_empty());
    }

    /// PROPERTY: Closure only ever adds layers: everything declared true
    /// stays enabled, and nothing outside the declaration's upward
    /// closure turns on by itself.
    #[test]
    fn property_closure_preserves_declared(declared in any_declaration()) {
        let mut report = DiagnosticReport::new();
        let set = CapabilitySet::from_declared(&declared, "doc", &mut report);

        for (cap, on) in &declared {
            if *on {
                prop_assert!(set.is_enabled(*cap), "{cap:?} was declared on");
            }
        }

        // A layer nothing depends on and nobody declared stays off.
        if declared.get(&Capability::I18n).copied() != Some(true) {
            prop_assert!(!set.is_enabled(Capability::I18n));
        }
    }

    /// PROPERTY: Closure never produces error diagnostics; an explicitly
    /// disabled dependency is at most a warning.
    #[test]
    fn property_closure_warns_never_errors(declared in any_declaration()) {
        let mut report = DiagnosticReport::new();
        CapabilitySet::from_declared(&declared, "doc", &mut report);
        prop_assert_eq!(report.errors(), 0);
    }
}
