//! Error types for the DCF engine
//!
//! Structural errors only: conditions that prevent a document from
//! entering the pipeline at all. Content-quality findings are reported
//! as [`crate::diagnostics::Diagnostic`]s instead, so a run always
//! completes with a full report.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// Document declares a `kind` the engine does not know
    #[error("unknown document kind '{kind}' in {source_id}")]
    UnknownKind { kind: String, source_id: String },

    /// Document is missing a required top-level field
    #[error("missing required field '{field}' in {source_id}")]
    MissingField { field: String, source_id: String },

    /// Document top level is not a mapping
    #[error("document {source_id} is not a key-value tree")]
    NotAMapping { source_id: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML decode error
    #[error("YAML decode error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON decode error
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Directory not found
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },
}
