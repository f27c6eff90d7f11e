//! Assembled model
//!
//! Composition entities (screens, navigation, flows) and the
//! [`ResolvedModel`] the orchestrator hands to the rule engine. All of
//! it is built from immutable documents during one run and discarded at
//! run end.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::capability::CapabilitySet;
use crate::component::Component;
use crate::data::DataSource;
use crate::tokens::TokenGraph;

/// A screen document body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    #[serde(default)]
    pub name: String,
    /// Declared data sources, by id
    #[serde(default)]
    pub data: BTreeMap<String, DataSource>,
    /// Composition tree; components referenced by name, sources by `$id`
    #[serde(default)]
    pub content: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Screen {
    pub fn from_body(name: &str, body: &Value) -> Result<Self, serde_json::Error> {
        let mut screen: Screen = serde_json::from_value(body.clone())?;
        screen.name = name.to_string();
        Ok(screen)
    }
}

/// A flow document body: an ordered sequence of steps over screens
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: BTreeMap<String, DataSource>,
    #[serde(default)]
    pub steps: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Flow {
    pub fn from_body(name: &str, body: &Value) -> Result<Self, serde_json::Error> {
        let mut flow: Flow = serde_json::from_value(body.clone())?;
        flow.name = name.to_string();
        Ok(flow)
    }
}

/// One node of the navigation graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Screen rendered at this route
    #[serde(default)]
    pub screen: Option<String>,
    /// Route ids reachable from here. Cycles are legal (back-navigation).
    #[serde(default)]
    pub transitions: Vec<String>,
}

/// A navigation document body: a directed graph of routes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub routes: BTreeMap<String, Route>,
    /// Entry routes; defaults to routes with no incoming transition
    #[serde(default)]
    pub roots: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Navigation {
    pub fn from_body(name: &str, body: &Value) -> Result<Self, serde_json::Error> {
        let mut nav: Navigation = serde_json::from_value(body.clone())?;
        nav.name = name.to_string();
        Ok(nav)
    }

    /// Effective entry points: declared `roots`, else routes with no
    /// incoming edge, else the first route in sorted order (a fully
    /// cyclic graph still needs an entry).
    pub fn effective_roots(&self) -> Vec<String> {
        if !self.roots.is_empty() {
            return self.roots.clone();
        }
        let mut no_incoming: Vec<String> = self
            .routes
            .keys()
            .filter(|id| {
                !self
                    .routes
                    .values()
                    .any(|r| r.transitions.iter().any(|t| t == *id))
            })
            .cloned()
            .collect();
        if no_incoming.is_empty() {
            if let Some(first) = self.routes.keys().next() {
                no_incoming.push(first.clone());
            }
        }
        no_incoming
    }
}

/// Everything one validation run resolves. Frozen before the rule
/// engine runs.
#[derive(Debug, Clone, Default)]
pub struct ResolvedModel {
    pub tokens: TokenGraph,
    pub capabilities: CapabilitySet,
    pub components: BTreeMap<String, Component>,
    pub screens: BTreeMap<String, Screen>,
    pub flows: BTreeMap<String, Flow>,
    pub navigations: BTreeMap<String, Navigation>,
}
