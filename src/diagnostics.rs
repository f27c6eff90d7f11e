//! Diagnostic accumulation
//!
//! Every finding the engine produces lands in one [`DiagnosticReport`]:
//! an ordered sequence of immutable [`Diagnostic`] records plus the
//! per-component variant coverage reports and the resolved capability
//! set. No stage aborts the run for content findings; the report is
//! always complete.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::capability::CapabilitySet;
use crate::matrix::CoverageReport;

/// Rule identifiers for the engine's diagnostic taxonomy.
pub mod rule {
    pub const MALFORMED_VERSION: &str = "MalformedVersion";
    pub const INCOMPATIBLE_MAJOR: &str = "IncompatibleMajor";
    pub const UNKNOWN_MINOR_FIELDS: &str = "UnknownMinorFields";
    pub const TOKEN_CYCLE: &str = "TokenCycleError";
    pub const TRANSFORM_BOUNDS: &str = "TransformBoundsError";
    pub const UNDEFINED_TOKEN_REFERENCE: &str = "UndefinedTokenReference";
    pub const PRECEDENCE_MISMATCH: &str = "PrecedenceMismatch";
    pub const UNRESOLVED_BINDING: &str = "UnresolvedBindingError";
    pub const DERIVED_SOURCE_CYCLE: &str = "DerivedSourceCycleError";
    pub const UNKNOWN_TRANSFORM: &str = "UnknownTransformError";
    pub const RULE_VIOLATION: &str = "RuleViolation";
    pub const SOFT_DEPENDENCY: &str = "SoftDependencyWarning";
    pub const INVALID_NAME: &str = "InvalidName";
    pub const MISSING_REQUIRED: &str = "MissingRequiredField";
    pub const INCOMPLETE_VARIANT: &str = "IncompleteVariant";
    pub const ACCESSIBILITY: &str = "AccessibilityViolation";
}

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single validation finding. Produced once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted location within the document set, e.g. `Button.variants.intent`
    pub path: String,
    /// Taxonomy identifier from [`rule`]
    pub rule_id: String,
    pub message: String,
}

/// Accumulated results of one validation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub diagnostics: Vec<Diagnostic>,
    /// Variant coverage per component name
    pub variant_coverage: BTreeMap<String, CoverageReport>,
    /// Capability closure the run resolved
    pub capabilities: CapabilitySet,
}

impl DiagnosticReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, path: &str, rule_id: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            severity,
            path: path.to_string(),
            rule_id: rule_id.to_string(),
            message: message.into(),
        });
    }

    pub fn error(&mut self, path: &str, rule_id: &str, message: impl Into<String>) {
        self.push(Severity::Error, path, rule_id, message);
    }

    pub fn warning(&mut self, path: &str, rule_id: &str, message: impl Into<String>) {
        self.push(Severity::Warning, path, rule_id, message);
    }

    pub fn info(&mut self, path: &str, rule_id: &str, message: impl Into<String>) {
        self.push(Severity::Info, path, rule_id, message);
    }

    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// True when no error-severity diagnostics were recorded
    pub fn is_success(&self) -> bool {
        self.errors() == 0
    }

    /// Absorb another report's diagnostics and coverage, preserving order.
    pub fn merge(&mut self, other: DiagnosticReport) {
        self.diagnostics.extend(other.diagnostics);
        self.variant_coverage.extend(other.variant_coverage);
    }
}
