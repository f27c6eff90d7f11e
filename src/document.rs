//! Document envelope
//!
//! Documents arrive as generic decoded key-value trees. This module
//! lifts the required top-level fields (`dcf_version`, `kind`, optional
//! `profile` and `name`) out of the tree and leaves the rest as the
//! untyped `body` for the stage that owns that `kind`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EngineError, EngineResult};

/// Kind of DCF document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Tokens,
    Theme,
    Theming,
    Component,
    Layout,
    Screen,
    Navigation,
    Flow,
    Rules,
    I18n,
}

impl DocumentKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tokens" => Some(Self::Tokens),
            "theme" => Some(Self::Theme),
            "theming" => Some(Self::Theming),
            "component" => Some(Self::Component),
            "layout" => Some(Self::Layout),
            "screen" => Some(Self::Screen),
            "navigation" => Some(Self::Navigation),
            "flow" => Some(Self::Flow),
            "rules" => Some(Self::Rules),
            "i18n" => Some(Self::I18n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tokens => "tokens",
            Self::Theme => "theme",
            Self::Theming => "theming",
            Self::Component => "component",
            Self::Layout => "layout",
            Self::Screen => "screen",
            Self::Navigation => "navigation",
            Self::Flow => "flow",
            Self::Rules => "rules",
            Self::I18n => "i18n",
        }
    }

    /// Kinds that name a model entity and must carry a `name` field
    pub fn requires_name(&self) -> bool {
        matches!(
            self,
            Self::Component | Self::Layout | Self::Screen | Self::Navigation | Self::Flow
        )
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decoded DCF document ready for the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Where the document came from (file name or synthetic id)
    pub source_id: String,
    /// Declared format version, unvalidated (the VersionGate owns that)
    pub dcf_version: String,
    pub kind: DocumentKind,
    /// Validation profile, if the document pins one
    pub profile: Option<String>,
    /// Entity name; required for kinds where [`DocumentKind::requires_name`]
    pub name: Option<String>,
    /// Everything below the envelope keys
    pub body: Value,
}

impl Document {
    /// Lift a decoded tree into a `Document`.
    ///
    /// Fails only on structural problems: non-mapping top level, missing
    /// `dcf_version`/`kind`, or an unknown `kind`.
    pub fn from_value(source_id: &str, value: Value) -> EngineResult<Self> {
        let map = match value {
            Value::Object(map) => map,
            _ => {
                return Err(EngineError::NotAMapping {
                    source_id: source_id.to_string(),
                })
            }
        };

        let dcf_version = match map.get("dcf_version").and_then(Value::as_str) {
            Some(v) => v.to_string(),
            None => {
                return Err(EngineError::MissingField {
                    field: "dcf_version".to_string(),
                    source_id: source_id.to_string(),
                })
            }
        };

        let kind_str = match map.get("kind").and_then(Value::as_str) {
            Some(k) => k,
            None => {
                return Err(EngineError::MissingField {
                    field: "kind".to_string(),
                    source_id: source_id.to_string(),
                })
            }
        };
        let kind = DocumentKind::parse(kind_str).ok_or_else(|| EngineError::UnknownKind {
            kind: kind_str.to_string(),
            source_id: source_id.to_string(),
        })?;

        let profile = map.get("profile").and_then(Value::as_str).map(String::from);
        let name = map.get("name").and_then(Value::as_str).map(String::from);

        let mut body = map;
        body.remove("dcf_version");
        body.remove("kind");
        body.remove("profile");
        body.remove("name");

        Ok(Self {
            source_id: source_id.to_string(),
            dcf_version,
            kind,
            profile,
            name,
            body: Value::Object(body),
        })
    }

    /// Path prefix for diagnostics about this document
    pub fn diag_path(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.source_id.clone(),
        }
    }
}

/// Check an entity name against the required pattern `^[A-Z][a-zA-Z0-9]*$`.
pub fn is_valid_entity_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric())
}
