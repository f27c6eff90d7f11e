//! Component model and validation
//!
//! A component owns its variant and state tables and references tokens
//! by path only. Validation covers naming, token-path existence against
//! the resolved graph, state precedence, blocking states, and
//! accessibility requirements. State resolution walks the declared
//! precedence and layers the winning state's overrides on top of the
//! variant's base tokens.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::diagnostics::{rule, DiagnosticReport};
use crate::document::is_valid_entity_name;
use crate::matrix::VariantMatrix;
use crate::profile::{CheckCategory, ProfileTable};
use crate::tokens::TokenGraph;

/// States that suppress everything declared after them in the
/// precedence order.
const BLOCKING_STATES: [&str; 2] = ["disabled", "loading"];

/// Style overrides: style key → token path
pub type TokenOverrides = BTreeMap<String, String>;

/// Accessibility declaration of a component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Accessibility {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Minimum touch target in dp, when the component is interactive
    #[serde(default)]
    pub touch_target: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A component document body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub props: Map<String, Value>,
    /// Variant axes: axis name → allowed values
    #[serde(default)]
    pub variants: BTreeMap<String, Vec<String>>,
    /// Declared states, in declaration order
    #[serde(default)]
    pub states: Vec<String>,
    /// Resolution order over the declared states
    #[serde(default)]
    pub state_precedence: Vec<String>,
    /// Base token overrides per variant value
    #[serde(default)]
    pub tokens: BTreeMap<String, TokenOverrides>,
    /// Token overrides layered when a state is active
    #[serde(default)]
    pub state_tokens: BTreeMap<String, TokenOverrides>,
    #[serde(default)]
    pub variant_matrix: Option<VariantMatrix>,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default, rename = "iconOnly")]
    pub icon_only: bool,
    /// Unknown fields, preserved for forward-compatible warnings
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Component {
    /// Decode a component from its document body, filling `name` from
    /// the envelope.
    pub fn from_body(name: &str, body: &Value) -> Result<Self, serde_json::Error> {
        let mut component: Component = serde_json::from_value(body.clone())?;
        component.name = name.to_string();
        Ok(component)
    }

    /// Resolve the effective style for a rendered instance.
    ///
    /// Walks `state_precedence` and applies the first active state,
    /// layering its overrides on the variant's base tokens. A blocking
    /// state wins only if the declaration orders it first; the
    /// validator warns about declarations where it does not.
    pub fn resolve_style(
        &self,
        variant_value: &str,
        active_states: &HashSet<&str>,
    ) -> ResolvedStyle {
        let mut style = self
            .tokens
            .get(variant_value)
            .cloned()
            .unwrap_or_default();

        let applied = self
            .state_precedence
            .iter()
            .find(|state| active_states.contains(state.as_str()));

        if let Some(state) = applied {
            if let Some(overrides) = self.state_tokens.get(state) {
                // States override, they do not replace the full set.
                for (key, path) in overrides {
                    style.insert(key.clone(), path.clone());
                }
            }
        }

        ResolvedStyle {
            applied_state: applied.cloned(),
            tokens: style,
        }
    }
}

/// Outcome of state resolution for one instance
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    /// Which state's overrides were layered, if any was active
    pub applied_state: Option<String>,
    pub tokens: TokenOverrides,
}

/// Validate a component against the resolved token graph and the
/// active profile.
pub fn validate_component(
    component: &Component,
    graph: &TokenGraph,
    table: &ProfileTable,
    report: &mut DiagnosticReport,
) {
    let path = component.name.clone();

    if !is_valid_entity_name(&component.name) {
        report.error(
            &path,
            rule::INVALID_NAME,
            format!(
                "component name '{}' must match ^[A-Z][a-zA-Z0-9]*$",
                component.name
            ),
        );
    }

    if component.category.is_none() {
        table.report(
            CheckCategory::MissingRequired,
            report,
            &path,
            rule::MISSING_REQUIRED,
            "component declares no 'category'",
        );
    }

    check_token_paths(component, graph, table, report, &path);
    check_precedence(component, report, &path);
    check_accessibility(component, table, report, &path);
}

fn check_token_paths(
    component: &Component,
    graph: &TokenGraph,
    table: &ProfileTable,
    report: &mut DiagnosticReport,
    path: &str,
) {
    let referenced = component
        .tokens
        .iter()
        .map(|(owner, overrides)| (owner, "tokens", overrides))
        .chain(
            component
                .state_tokens
                .iter()
                .map(|(owner, overrides)| (owner, "state_tokens", overrides)),
        );

    for (owner, section, overrides) in referenced {
        for token_path in overrides.values() {
            if !graph.contains(token_path) {
                table.report(
                    CheckCategory::UndefinedToken,
                    report,
                    &format!("{path}.{section}.{owner}"),
                    rule::UNDEFINED_TOKEN_REFERENCE,
                    format!("token path '{token_path}' is not defined in any layer"),
                );
            }
        }
    }
}

fn check_precedence(component: &Component, report: &mut DiagnosticReport, path: &str) {
    if component.state_precedence.is_empty() {
        return;
    }

    let declared: HashSet<&str> = component.states.iter().map(String::as_str).collect();
    let precedence: HashSet<&str> = component
        .state_precedence
        .iter()
        .map(String::as_str)
        .collect();

    let missing: Vec<&str> = component
        .states
        .iter()
        .map(String::as_str)
        .filter(|s| !precedence.contains(s))
        .collect();
    let extra: Vec<&str> = component
        .state_precedence
        .iter()
        .map(String::as_str)
        .filter(|s| !declared.contains(s))
        .collect();

    if !missing.is_empty() || !extra.is_empty() {
        report.error(
            &format!("{path}.state_precedence"),
            rule::PRECEDENCE_MISMATCH,
            format!(
                "state_precedence must be a permutation of states (missing: [{}], extra: [{}])",
                missing.join(", "),
                extra.join(", ")
            ),
        );
    }

    if component.state_precedence.len()
        != precedence.len()
    {
        report.error(
            &format!("{path}.state_precedence"),
            rule::PRECEDENCE_MISMATCH,
            "state_precedence contains duplicate entries",
        );
    }

    // A blocking state listed after a non-blocking one loses the
    // resolution walk to it.
    for blocking in BLOCKING_STATES {
        if let Some(pos) = component
            .state_precedence
            .iter()
            .position(|s| s == blocking)
        {
            let earlier_non_blocking = component.state_precedence[..pos]
                .iter()
                .any(|s| !BLOCKING_STATES.contains(&s.as_str()));
            if earlier_non_blocking {
                report.warning(
                    &format!("{path}.state_precedence"),
                    rule::PRECEDENCE_MISMATCH,
                    format!("blocking state '{blocking}' is declared after non-blocking states"),
                );
            }
        }
    }
}

fn check_accessibility(
    component: &Component,
    table: &ProfileTable,
    report: &mut DiagnosticReport,
    path: &str,
) {
    if component.icon_only && component.accessibility.label.is_none() {
        table.report(
            CheckCategory::Accessibility,
            report,
            &format!("{path}.accessibility"),
            rule::ACCESSIBILITY,
            "iconOnly controls require an accessible label",
        );
    }

    let interactive = component
        .category
        .as_deref()
        .map(|c| c == "control" || c == "input")
        .unwrap_or(false);
    if interactive && component.accessibility.role.is_none() {
        table.report(
            CheckCategory::Accessibility,
            report,
            &format!("{path}.accessibility"),
            rule::ACCESSIBILITY,
            "interactive components must declare an accessibility role",
        );
    }
}
