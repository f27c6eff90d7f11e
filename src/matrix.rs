//! Variant matrix engine
//!
//! Validates a component's variant combinations against its matrix
//! rules and computes the coverage report. A rule matches a combination
//! when every axis it specifies equals the combination's value for that
//! axis (or contains it, when the rule gives a set). `deny` takes
//! precedence over `allow` whenever both match.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{rule, DiagnosticReport};
use crate::profile::{CheckCategory, ProfileTable};

/// One value per variant axis
pub type Combination = BTreeMap<String, String>;

/// Matrix evaluation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixMode {
    #[default]
    All,
    Allowlist,
    Blocklist,
}

/// Axis constraint inside a matrix rule: a single value or a set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueSpec {
    One(String),
    Many(Vec<String>),
}

impl ValueSpec {
    fn matches(&self, value: &str) -> bool {
        match self {
            ValueSpec::One(v) => v == value,
            ValueSpec::Many(vs) => vs.iter().any(|v| v == value),
        }
    }

    fn values(&self) -> Vec<&str> {
        match self {
            ValueSpec::One(v) => vec![v.as_str()],
            ValueSpec::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

/// A single allow/deny rule: axis name → constraint
pub type MatrixRule = BTreeMap<String, ValueSpec>;

/// Declared matrix of a component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantMatrix {
    #[serde(default)]
    pub mode: MatrixMode,
    #[serde(default)]
    pub allow: Vec<MatrixRule>,
    #[serde(default)]
    pub deny: Vec<MatrixRule>,
    /// Per-axis values an invalid combination resolves to at render time
    #[serde(default)]
    pub fallback: BTreeMap<String, String>,
}

/// Coverage arithmetic over the full cartesian product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub total_combinations: usize,
    pub valid_combinations: usize,
    pub invalid_combinations: usize,
    /// valid / total, 1.0 for an empty product
    pub coverage: f64,
}

fn rule_matches(rule: &MatrixRule, combination: &Combination) -> bool {
    rule.iter().all(|(axis, spec)| {
        combination
            .get(axis)
            .map(|value| spec.matches(value))
            .unwrap_or(false)
    })
}

impl VariantMatrix {
    /// Is this combination valid under the matrix rules?
    ///
    /// Any matching `allow` rule is sufficient (logical OR); a matching
    /// `deny` rule invalidates the combination in every mode.
    pub fn is_valid(&self, combination: &Combination) -> bool {
        let denied = self.deny.iter().any(|r| rule_matches(r, combination));
        match self.mode {
            MatrixMode::All | MatrixMode::Blocklist => !denied,
            MatrixMode::Allowlist => {
                !denied && self.allow.iter().any(|r| rule_matches(r, combination))
            }
        }
    }

    /// Resolve an invalid combination to the declared fallback values.
    ///
    /// Axes without a fallback entry keep their requested value.
    pub fn resolve_fallback(&self, combination: &Combination) -> Combination {
        let mut resolved = combination.clone();
        for (axis, value) in &self.fallback {
            if resolved.contains_key(axis) {
                resolved.insert(axis.clone(), value.clone());
            }
        }
        resolved
    }
}

/// Enumerate the cartesian product of the axes, in axis-sorted order.
pub fn enumerate_combinations(axes: &BTreeMap<String, Vec<String>>) -> Vec<Combination> {
    let mut combinations = vec![Combination::new()];
    for (axis, values) in axes {
        let mut next = Vec::with_capacity(combinations.len() * values.len());
        for partial in &combinations {
            for value in values {
                let mut extended = partial.clone();
                extended.insert(axis.clone(), value.clone());
                next.push(extended);
            }
        }
        combinations = next;
    }
    combinations
}

/// Evaluate a component's matrix over its axes.
///
/// Invalid combinations are reported through the profile's
/// incomplete-variant strictness; the coverage report is returned
/// either way. With no declared matrix everything is valid.
pub fn evaluate_matrix(
    component_name: &str,
    axes: &BTreeMap<String, Vec<String>>,
    matrix: Option<&VariantMatrix>,
    table: &ProfileTable,
    report: &mut DiagnosticReport,
) -> CoverageReport {
    let combinations = enumerate_combinations(axes);
    let total = combinations.len();

    let default_matrix = VariantMatrix::default();
    let matrix = matrix.unwrap_or(&default_matrix);

    check_matrix_declaration(component_name, axes, matrix, table, report);

    let mut valid = 0usize;
    for combination in &combinations {
        if matrix.is_valid(combination) {
            valid += 1;
        } else {
            table.report(
                CheckCategory::IncompleteVariant,
                report,
                &format!("{component_name}.variant_matrix"),
                rule::INCOMPLETE_VARIANT,
                format!(
                    "combination {} is invalid and will fall back to {}",
                    describe(combination),
                    describe(&matrix.resolve_fallback(combination))
                ),
            );
        }
    }

    let invalid = total - valid;
    CoverageReport {
        total_combinations: total,
        valid_combinations: valid,
        invalid_combinations: invalid,
        coverage: if total == 0 {
            1.0
        } else {
            valid as f64 / total as f64
        },
    }
}

/// Rules and fallback entries must only name declared axes and values.
fn check_matrix_declaration(
    component_name: &str,
    axes: &BTreeMap<String, Vec<String>>,
    matrix: &VariantMatrix,
    table: &ProfileTable,
    report: &mut DiagnosticReport,
) {
    let rules = matrix
        .allow
        .iter()
        .map(|r| ("allow", r))
        .chain(matrix.deny.iter().map(|r| ("deny", r)));

    for (list, matrix_rule) in rules {
        for (axis, spec) in matrix_rule {
            match axes.get(axis) {
                None => {
                    table.report(
                        CheckCategory::IncompleteVariant,
                        report,
                        &format!("{component_name}.variant_matrix.{list}"),
                        rule::INCOMPLETE_VARIANT,
                        format!("rule references unknown axis '{axis}'"),
                    );
                }
                Some(values) => {
                    for value in spec.values() {
                        if !values.iter().any(|v| v == value) {
                            table.report(
                                CheckCategory::IncompleteVariant,
                                report,
                                &format!("{component_name}.variant_matrix.{list}"),
                                rule::INCOMPLETE_VARIANT,
                                format!("rule value '{value}' is not in axis '{axis}'"),
                            );
                        }
                    }
                }
            }
        }
    }

    for (axis, value) in &matrix.fallback {
        let known = axes
            .get(axis)
            .map(|values| values.iter().any(|v| v == value))
            .unwrap_or(false);
        if !known {
            table.report(
                CheckCategory::IncompleteVariant,
                report,
                &format!("{component_name}.variant_matrix.fallback"),
                rule::INCOMPLETE_VARIANT,
                format!("fallback '{axis}: {value}' does not name a declared axis value"),
            );
        }
    }
}

fn describe(combination: &Combination) -> String {
    let parts: Vec<String> = combination
        .iter()
        .map(|(axis, value)| format!("{axis}={value}"))
        .collect();
    format!("{{{}}}", parts.join(", "))
}
