//! Data sources and bindings
//!
//! Screens and flows declare a `data` map of sources and reference them
//! from their content trees with `$name` / `$name.field` bindings.
//! Derived sources form a DAG over other sources and apply a transform
//! from the fixed vocabulary. Each source also carries a small
//! lifecycle state machine used by generators to derive loading UI.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::diagnostics::{rule, DiagnosticReport};

/// Transform names a `derived` source may use
pub const TRANSFORM_VOCABULARY: [&str; 8] = [
    "filter", "map", "sort", "count", "sum", "first", "last", "unique",
];

/// Where a data source gets its values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    Api,
    Context,
    Local,
    Derived,
    Static,
}

/// A declared data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub kind: DataSourceKind,
    /// Source id a `derived` source reads from
    #[serde(default)]
    pub from: Option<String>,
    /// Transform applied by a `derived` source
    #[serde(default)]
    pub transform: Option<String>,
    /// Cache TTL in seconds, enables the stale transition
    #[serde(default)]
    pub ttl: Option<u64>,
    #[serde(default)]
    pub stale_while_revalidate: bool,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// Lifecycle of a bound source: `idle → loading → success | error`;
/// `success → stale` when the TTL elapses under
/// `stale_while_revalidate`, `stale → loading` on refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataState {
    Idle,
    Loading,
    Success,
    Error,
    Stale,
}

/// Events driving [`DataState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEvent {
    Fetch,
    Resolve,
    Reject,
    TtlElapsed,
    Refresh,
}

impl DataState {
    /// Apply an event; `None` means the transition is not legal from
    /// the current state.
    pub fn advance(self, event: DataEvent, stale_while_revalidate: bool) -> Option<DataState> {
        match (self, event) {
            (DataState::Idle, DataEvent::Fetch) => Some(DataState::Loading),
            (DataState::Loading, DataEvent::Resolve) => Some(DataState::Success),
            (DataState::Loading, DataEvent::Reject) => Some(DataState::Error),
            (DataState::Success, DataEvent::TtlElapsed) if stale_while_revalidate => {
                Some(DataState::Stale)
            }
            (DataState::Stale, DataEvent::Refresh) => Some(DataState::Loading),
            _ => None,
        }
    }
}

/// A `$`-binding found in a content tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Source id after the `$`
    pub source: String,
    /// Optional `.field` projection
    pub field: Option<String>,
    /// Dotted location of the binding within the tree
    pub at: String,
}

/// Parse a `$name` or `$name.field` expression.
pub fn parse_binding(expr: &str, at: &str) -> Option<Binding> {
    let rest = expr.strip_prefix('$')?;
    if rest.is_empty() {
        return None;
    }
    let (source, field) = match rest.split_once('.') {
        Some((source, field)) if !field.is_empty() => (source, Some(field.to_string())),
        Some(_) => return None,
        None => (rest, None),
    };
    if source.is_empty() || !source.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(Binding {
        source: source.to_string(),
        field,
        at: at.to_string(),
    })
}

/// Collect every `$`-binding in a content tree.
pub fn collect_bindings(tree: &Value, prefix: &str, out: &mut Vec<Binding>) {
    match tree {
        Value::String(s) => {
            if let Some(binding) = parse_binding(s, prefix) {
                out.push(binding);
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect_bindings(item, &format!("{prefix}[{i}]"), out);
            }
        }
        Value::Object(map) => {
            for (key, value) in map {
                collect_bindings(value, &format!("{prefix}.{key}"), out);
            }
        }
        _ => {}
    }
}

/// Resolve a screen/flow's declared sources and bindings.
///
/// Reports `UnresolvedBindingError` for bindings and `from` references
/// to unknown ids, `UnknownTransformError` for out-of-vocabulary
/// transforms, and `DerivedSourceCycleError` when derived sources do
/// not form a DAG. Returns the sources that survived validation.
pub fn resolve_data(
    owner: &str,
    data: &BTreeMap<String, DataSource>,
    content: &Value,
    report: &mut DiagnosticReport,
) -> BTreeMap<String, DataState> {
    check_derived(owner, data, report);

    let mut bindings = Vec::new();
    collect_bindings(content, owner, &mut bindings);
    for binding in &bindings {
        if !data.contains_key(&binding.source) {
            report.error(
                &binding.at,
                rule::UNRESOLVED_BINDING,
                format!("binding '${}' has no declared data source", binding.source),
            );
        }
    }

    // Every source starts idle; generators drive the machine from there.
    data.keys()
        .map(|id| (id.clone(), DataState::Idle))
        .collect()
}

fn check_derived(
    owner: &str,
    data: &BTreeMap<String, DataSource>,
    report: &mut DiagnosticReport,
) {
    for (id, source) in data {
        if source.kind != DataSourceKind::Derived {
            continue;
        }
        let path = format!("{owner}.data.{id}");

        match &source.transform {
            None => {
                report.error(
                    &path,
                    rule::UNKNOWN_TRANSFORM,
                    "derived source declares no transform",
                );
            }
            Some(t) if !TRANSFORM_VOCABULARY.contains(&t.as_str()) => {
                report.error(
                    &path,
                    rule::UNKNOWN_TRANSFORM,
                    format!("transform '{t}' is not in the fixed vocabulary"),
                );
            }
            Some(_) => {}
        }

        match &source.from {
            None => {
                report.error(
                    &path,
                    rule::UNRESOLVED_BINDING,
                    "derived source declares no 'from' source",
                );
            }
            Some(from) if !data.contains_key(from) => {
                report.error(
                    &path,
                    rule::UNRESOLVED_BINDING,
                    format!("derived source reads unknown source '{from}'"),
                );
            }
            Some(_) => {}
        }
    }

    // Cycle check over the derived edges, visited-set DFS.
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        InProgress,
        Done,
    }

    fn visit(
        id: &str,
        data: &BTreeMap<String, DataSource>,
        marks: &mut HashMap<String, Mark>,
        owner: &str,
        report: &mut DiagnosticReport,
    ) -> bool {
        match marks.get(id) {
            Some(Mark::Done) => return true,
            Some(Mark::InProgress) => {
                report.error(
                    &format!("{owner}.data.{id}"),
                    rule::DERIVED_SOURCE_CYCLE,
                    format!("derived source cycle through '{id}'"),
                );
                return false;
            }
            None => {}
        }
        marks.insert(id.to_string(), Mark::InProgress);
        let ok = match data.get(id) {
            Some(source) if source.kind == DataSourceKind::Derived => source
                .from
                .as_deref()
                .filter(|from| data.contains_key(*from))
                .map(|from| visit(from, data, marks, owner, report))
                .unwrap_or(true),
            _ => true,
        };
        marks.insert(id.to_string(), Mark::Done);
        ok
    }

    let mut marks = HashMap::new();
    for id in data.keys() {
        visit(id, data, &mut marks, owner, report);
    }
}
