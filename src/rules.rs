//! Rule engine
//!
//! Global rules are data, not code: a closed enum of rule kinds with
//! typed parameters, evaluated over the fully resolved model. Each
//! violation is a `RuleViolation` diagnostic tagged with the rule id it
//! came from. Runs last; nothing it reads is mutated afterwards.
//!
//! A content node counts as a primary action when it carries
//! `"primary": true`.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostics::{rule, DiagnosticReport};
use crate::model::{Navigation, ResolvedModel};

/// The closed set of rule kinds. Extending this enum is a schema
/// change, not a runtime plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "id")]
pub enum Rule {
    /// Navigation graphs must stay within `max` levels from their roots
    #[serde(rename = "navigation.max_depth")]
    NavigationMaxDepth { max: usize },

    /// At most one primary action per screen
    #[serde(rename = "layout.one_primary_action_per_screen")]
    OnePrimaryActionPerScreen,

    /// Interactive components must meet the minimum touch target;
    /// `min_token` resolves the bound from the token graph, `min` is a
    /// literal dp value
    #[serde(rename = "accessibility.min_touch_target")]
    MinTouchTarget {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        min_token: Option<String>,
    },
}

/// Decode the `rules` list of a rules document, warning on entries the
/// engine does not recognize.
pub fn parse_rules(body: &Value, path: &str, report: &mut DiagnosticReport) -> Vec<Rule> {
    let Some(entries) = body.get("rules").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut rules = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<Rule>(entry.clone()) {
            Ok(rule) => rules.push(rule),
            Err(_) => {
                let id = entry
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or("<missing id>");
                report.warning(
                    &format!("{path}.rules[{i}]"),
                    rule::RULE_VIOLATION,
                    format!("rule '{id}' is not a recognized rule kind"),
                );
            }
        }
    }
    rules
}

/// Evaluate every rule over the assembled model.
pub fn evaluate(rules: &[Rule], model: &ResolvedModel, report: &mut DiagnosticReport) {
    for r in rules {
        match r {
            Rule::NavigationMaxDepth { max } => check_max_depth(*max, model, report),
            Rule::OnePrimaryActionPerScreen => check_primary_actions(model, report),
            Rule::MinTouchTarget { min, min_token } => {
                check_touch_targets(*min, min_token.as_deref(), model, report)
            }
        }
    }

    // Reachability is reported whenever navigation is present, not
    // gated on a declared rule.
    for nav in model.navigations.values() {
        check_reachability(nav, report);
    }
}

/// Depth of the navigation graph: BFS levels from the entry routes.
/// The visited set makes back-navigation cycles terminate.
pub fn navigation_depth(nav: &Navigation) -> usize {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    let mut depth = 0;

    for root in nav.effective_roots() {
        if let Some((id, _)) = nav.routes.get_key_value(&root) {
            if visited.insert(id.as_str()) {
                queue.push_back((id.as_str(), 1));
            }
        }
    }

    while let Some((id, level)) = queue.pop_front() {
        depth = depth.max(level);
        if let Some(route) = nav.routes.get(id) {
            for next in &route.transitions {
                if let Some((next_id, _)) = nav.routes.get_key_value(next) {
                    if visited.insert(next_id.as_str()) {
                        queue.push_back((next_id.as_str(), level + 1));
                    }
                }
            }
        }
    }
    depth
}

fn check_max_depth(max: usize, model: &ResolvedModel, report: &mut DiagnosticReport) {
    for nav in model.navigations.values() {
        let depth = navigation_depth(nav);
        if depth > max {
            report.error(
                &nav.name,
                rule::RULE_VIOLATION,
                format!("navigation.max_depth: graph depth {depth} exceeds maximum {max}"),
            );
        }
    }
}

fn check_primary_actions(model: &ResolvedModel, report: &mut DiagnosticReport) {
    for screen in model.screens.values() {
        let count = count_primary_actions(&screen.content);
        if count > 1 {
            report.error(
                &screen.name,
                rule::RULE_VIOLATION,
                format!(
                    "layout.one_primary_action_per_screen: found {count} primary actions"
                ),
            );
        }
    }
}

fn count_primary_actions(tree: &Value) -> usize {
    match tree {
        Value::Object(map) => {
            let own = usize::from(map.get("primary") == Some(&Value::Bool(true)));
            own + map.values().map(count_primary_actions).sum::<usize>()
        }
        Value::Array(items) => items.iter().map(count_primary_actions).sum(),
        _ => 0,
    }
}

fn check_touch_targets(
    min: Option<f64>,
    min_token: Option<&str>,
    model: &ResolvedModel,
    report: &mut DiagnosticReport,
) {
    let resolved_min = min_token
        .and_then(|path| model.tokens.value(path))
        .and_then(Value::as_f64)
        .or(min);

    let Some(bound) = resolved_min else {
        report.warning(
            "rules",
            rule::RULE_VIOLATION,
            "accessibility.min_touch_target declares no resolvable minimum",
        );
        return;
    };

    for component in model.components.values() {
        if let Some(target) = component.accessibility.touch_target {
            if target < bound {
                report.error(
                    &format!("{}.accessibility.touch_target", component.name),
                    rule::RULE_VIOLATION,
                    format!(
                        "accessibility.min_touch_target: {target}dp is below the minimum {bound}dp"
                    ),
                );
            }
        }
    }
}

fn check_reachability(nav: &Navigation, report: &mut DiagnosticReport) {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for root in nav.effective_roots() {
        if let Some((id, _)) = nav.routes.get_key_value(&root) {
            if visited.insert(id.as_str()) {
                queue.push_back(id.as_str());
            }
        }
    }
    while let Some(id) = queue.pop_front() {
        if let Some(route) = nav.routes.get(id) {
            for next in &route.transitions {
                if let Some((next_id, _)) = nav.routes.get_key_value(next) {
                    if visited.insert(next_id.as_str()) {
                        queue.push_back(next_id.as_str());
                    }
                }
            }
        }
    }

    for id in nav.routes.keys() {
        if !visited.contains(id.as_str()) {
            report.warning(
                &format!("{}.routes.{id}", nav.name),
                rule::RULE_VIOLATION,
                format!("route '{id}' is unreachable from the navigation roots"),
            );
        }
    }
}
