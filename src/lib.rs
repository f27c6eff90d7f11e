//! dcfc - semantic validation and resolution engine for the Design
//! Concept Format
//!
//! Turns a set of cross-referencing, already-decoded DCF documents
//! (tokens, themes, components, screens, navigation, flows, rules)
//! into a validated, fully resolved design model plus one ordered
//! diagnostic report.

pub mod cache;
pub mod capability;
pub mod cli;
pub mod component;
pub mod data;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod loader;
pub mod matrix;
pub mod model;
pub mod orchestrator;
pub mod profile;
pub mod rules;
pub mod tokens;
pub mod version;

// Re-exports for convenience
pub use capability::{Capability, CapabilitySet};
pub use component::{validate_component, Component};
pub use diagnostics::{Diagnostic, DiagnosticReport, Severity};
pub use document::{Document, DocumentKind};
pub use error::{EngineError, EngineResult};
pub use matrix::{CoverageReport, VariantMatrix};
pub use model::ResolvedModel;
pub use orchestrator::{Orchestrator, ResolutionConfig, ValidationOutcome, ValidationRun};
pub use profile::{CheckCategory, Profile, ProfileTable, Strictness};
pub use tokens::TokenGraph;
