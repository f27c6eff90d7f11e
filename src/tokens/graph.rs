//! Token graph
//!
//! Every token leaf (from the base tokens document and the merged theme
//! tree) becomes a node in an arena, addressed by dotted path through
//! an interned index. Reference expressions are resolved by DFS over
//! node handles; a visited-set catches cycles, which resolve to the
//! [`ResolvedToken::Unresolved`] sentinel instead of recursing forever.
//!
//! Value grammar for a token leaf string:
//! - `{dotted.path}` — reference to another token (theme leaves live
//!   under the `theme.` prefix)
//! - `{dotted.path} darken(10%)` — reference followed by one or more
//!   transform calls, applied left to right
//! - anything else — literal

use std::collections::HashMap;

use serde_json::Value;

use crate::diagnostics::{rule, DiagnosticReport};
use crate::profile::{CheckCategory, ProfileTable};
use crate::tokens::transform::{self, apply_transform};

/// Handle into the token arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId(usize);

/// Final value of a token after resolution
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedToken {
    Concrete(Value),
    /// Sentinel for cycles, undefined references, and failed transforms
    Unresolved,
}

impl ResolvedToken {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Concrete(v) => Some(v),
            Self::Unresolved => None,
        }
    }
}

#[derive(Debug, Clone)]
struct TokenNode {
    path: String,
    raw: RawValue,
}

#[derive(Debug, Clone)]
enum RawValue {
    Literal(Value),
    Reference { target: String, transforms: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum VisitState {
    Unvisited,
    Visiting,
    Done,
}

/// Fully resolved token set for one validation run.
///
/// Frozen once built; downstream stages only read it.
#[derive(Debug, Clone, Default)]
pub struct TokenGraph {
    nodes: Vec<TokenNode>,
    index: HashMap<String, TokenId>,
    resolved: Vec<ResolvedToken>,
}

impl TokenGraph {
    /// Build and resolve the graph.
    ///
    /// `tokens` is the base token tree; `theme` the merged theme tree
    /// (its leaves are indexed under `theme.`). Cycle and transform
    /// findings are always errors; undefined references route through
    /// the profile's undefined-token strictness.
    pub fn build(
        tokens: &Value,
        theme: &Value,
        table: &ProfileTable,
        report: &mut DiagnosticReport,
    ) -> Self {
        let mut graph = Self::default();
        graph.add_tree(tokens, "");
        graph.add_tree(theme, "theme");
        graph.resolve_all(table, report);
        graph
    }

    fn add_tree(&mut self, tree: &Value, prefix: &str) {
        if let Value::Object(map) = tree {
            for (key, value) in map {
                if prefix.is_empty() && key == "capabilities" {
                    continue;
                }
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                match value {
                    Value::Object(_) => self.add_tree(value, &path),
                    leaf => self.add_leaf(path, leaf),
                }
            }
        }
    }

    fn add_leaf(&mut self, path: String, value: &Value) {
        let raw = match value {
            Value::String(s) => parse_expression(s),
            other => RawValue::Literal(other.clone()),
        };
        let id = TokenId(self.nodes.len());
        self.index.insert(path.clone(), id);
        self.nodes.push(TokenNode { path, raw });
    }

    fn resolve_all(&mut self, table: &ProfileTable, report: &mut DiagnosticReport) {
        let mut states = vec![VisitState::Unvisited; self.nodes.len()];
        let mut resolved = vec![ResolvedToken::Unresolved; self.nodes.len()];
        for id in 0..self.nodes.len() {
            self.resolve_node(TokenId(id), &mut states, &mut resolved, table, report);
        }
        self.resolved = resolved;
    }

    fn resolve_node(
        &self,
        id: TokenId,
        states: &mut [VisitState],
        resolved: &mut [ResolvedToken],
        table: &ProfileTable,
        report: &mut DiagnosticReport,
    ) -> ResolvedToken {
        match states[id.0] {
            VisitState::Done => return resolved[id.0].clone(),
            VisitState::Visiting => {
                // The caller reports the cycle at the referencing node.
                return ResolvedToken::Unresolved;
            }
            VisitState::Unvisited => {}
        }
        states[id.0] = VisitState::Visiting;

        let node = &self.nodes[id.0];
        let value = match &node.raw {
            RawValue::Literal(v) => ResolvedToken::Concrete(v.clone()),
            RawValue::Reference { target, transforms } => {
                match self.index.get(target) {
                    None => {
                        table.report(
                            CheckCategory::UndefinedToken,
                            report,
                            &node.path,
                            rule::UNDEFINED_TOKEN_REFERENCE,
                            format!("reference to undefined token '{target}'"),
                        );
                        ResolvedToken::Unresolved
                    }
                    Some(&target_id) => {
                        if states[target_id.0] == VisitState::Visiting {
                            report.error(
                                &node.path,
                                rule::TOKEN_CYCLE,
                                format!(
                                    "token reference cycle through '{}'",
                                    self.nodes[target_id.0].path
                                ),
                            );
                            ResolvedToken::Unresolved
                        } else {
                            let base =
                                self.resolve_node(target_id, states, resolved, table, report);
                            self.apply_transforms(&node.path, base, transforms, report)
                        }
                    }
                }
            }
        };

        states[id.0] = VisitState::Done;
        resolved[id.0] = value.clone();
        value
    }

    fn apply_transforms(
        &self,
        path: &str,
        base: ResolvedToken,
        transforms: &[String],
        report: &mut DiagnosticReport,
    ) -> ResolvedToken {
        if transforms.is_empty() {
            return base;
        }
        let Some(Value::String(mut current)) = base.as_value().cloned() else {
            // Unresolved base or non-string base; diagnostics for the
            // base were already recorded.
            if base != ResolvedToken::Unresolved {
                report.error(
                    path,
                    rule::TRANSFORM_BOUNDS,
                    "transform applied to a non-color value",
                );
            }
            return ResolvedToken::Unresolved;
        };

        for expr in transforms {
            match apply_transform(expr, &current) {
                Ok(next) => current = next,
                Err(err) => {
                    report.error(path, rule::TRANSFORM_BOUNDS, err.to_string());
                    return ResolvedToken::Unresolved;
                }
            }
        }
        ResolvedToken::Concrete(Value::String(current))
    }

    /// True if any layer defines the path.
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn lookup(&self, path: &str) -> Option<&ResolvedToken> {
        self.index.get(path).map(|id| &self.resolved[id.0])
    }

    /// Resolved concrete value at `path`, if the token exists and resolved.
    pub fn value(&self, path: &str) -> Option<&Value> {
        self.lookup(path).and_then(ResolvedToken::as_value)
    }

    /// All token paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn parse_expression(s: &str) -> RawValue {
    let trimmed = s.trim();
    if let Some(rest) = trimmed.strip_prefix('{') {
        if let Some(close) = rest.find('}') {
            let target = rest[..close].trim().to_string();
            let tail = rest[close + 1..].trim();
            let transforms: Vec<String> = if tail.is_empty() {
                Vec::new()
            } else {
                tail.split_whitespace().map(String::from).collect()
            };
            let all_transforms = transforms
                .iter()
                .all(|t| transform::is_transform_expr(t));
            if !target.is_empty() && all_transforms {
                return RawValue::Reference { target, transforms };
            }
        }
    }
    RawValue::Literal(Value::String(s.to_string()))
}
