//! Capability resolution
//!
//! Each layer of the format (tokens, themes, components, ...) is an
//! independently adoptable capability. A document may declare which
//! layers it opts into; enabling a layer pulls in everything it
//! transitively depends on. The dependency table is a small fixed DAG,
//! so closure is a plain fixed-point loop.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostics::{rule, DiagnosticReport};

/// A declarable layer of the format
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Tokens,
    Themes,
    Components,
    Layouts,
    Screens,
    Navigation,
    Flows,
    I18n,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::Tokens,
        Capability::Themes,
        Capability::Components,
        Capability::Layouts,
        Capability::Screens,
        Capability::Navigation,
        Capability::Flows,
        Capability::I18n,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tokens" => Some(Self::Tokens),
            "themes" => Some(Self::Themes),
            "components" => Some(Self::Components),
            "layouts" => Some(Self::Layouts),
            "screens" => Some(Self::Screens),
            "navigation" => Some(Self::Navigation),
            "flows" => Some(Self::Flows),
            "i18n" => Some(Self::I18n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tokens => "tokens",
            Self::Themes => "themes",
            Self::Components => "components",
            Self::Layouts => "layouts",
            Self::Screens => "screens",
            Self::Navigation => "navigation",
            Self::Flows => "flows",
            Self::I18n => "i18n",
        }
    }

    /// Static dependency table. Acyclic by construction.
    pub fn requires(&self) -> &'static [Capability] {
        match self {
            Self::Themes => &[Capability::Tokens],
            Self::Components => &[Capability::Tokens],
            Self::Screens => &[Capability::Components],
            Self::Navigation => &[Capability::Layouts, Capability::Screens],
            Self::Flows => &[Capability::Screens],
            _ => &[],
        }
    }
}

/// Enabled/disabled verdict per layer, after closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    enabled: BTreeMap<Capability, bool>,
}

impl Default for CapabilitySet {
    /// With no declaration, every layer is enabled.
    fn default() -> Self {
        Self::all_enabled()
    }
}

impl CapabilitySet {
    pub fn all_enabled() -> Self {
        let enabled = Capability::ALL.iter().map(|c| (*c, true)).collect();
        Self { enabled }
    }

    /// Build from a declared `capabilities` map and close over the
    /// dependency table.
    ///
    /// Layers the declaration does not mention stay disabled; a declared
    /// layer whose dependency is explicitly disabled yields a
    /// `SoftDependencyWarning` (dependencies are advisory, so the
    /// dependency is enabled anyway).
    pub fn from_declared(
        declared: &BTreeMap<Capability, bool>,
        path: &str,
        report: &mut DiagnosticReport,
    ) -> Self {
        let mut enabled: BTreeMap<Capability, bool> =
            Capability::ALL.iter().map(|c| (*c, false)).collect();

        for (cap, on) in declared {
            enabled.insert(*cap, *on);
        }

        // Fixed point over the dependency DAG.
        loop {
            let mut changed = false;
            for cap in Capability::ALL {
                if enabled[&cap] {
                    for dep in cap.requires() {
                        if !enabled[dep] {
                            if declared.get(dep) == Some(&false) {
                                report.warning(
                                    path,
                                    rule::SOFT_DEPENDENCY,
                                    format!(
                                        "'{}' depends on '{}', which is explicitly disabled",
                                        cap.as_str(),
                                        dep.as_str()
                                    ),
                                );
                            }
                            enabled.insert(*dep, true);
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }

        Self { enabled }
    }

    /// Parse the `capabilities` key of a document body, if present.
    ///
    /// Unknown layer names are ignored; an absent or non-mapping value
    /// means "everything enabled".
    pub fn from_body(body: &Value, path: &str, report: &mut DiagnosticReport) -> Self {
        let Some(map) = body.get("capabilities").and_then(Value::as_object) else {
            return Self::all_enabled();
        };

        let declared: BTreeMap<Capability, bool> = map
            .iter()
            .filter_map(|(k, v)| Some((Capability::parse(k)?, v.as_bool()?)))
            .collect();

        Self::from_declared(&declared, path, report)
    }

    pub fn is_enabled(&self, cap: Capability) -> bool {
        self.enabled.get(&cap).copied().unwrap_or(false)
    }

    pub fn enabled_layers(&self) -> Vec<Capability> {
        self.enabled
            .iter()
            .filter(|(_, on)| **on)
            .map(|(c, _)| *c)
            .collect()
    }
}
