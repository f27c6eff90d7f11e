//! Validation profiles
//!
//! A profile is a strictness tier applied uniformly to one document.
//! The table maps each check category to a verdict; `strict` is a
//! superset of `standard`, which is a superset of `lite`.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{DiagnosticReport, Severity};

/// Validation strictness tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Lite,
    #[default]
    Standard,
    Strict,
}

impl Profile {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lite" => Some(Self::Lite),
            "standard" => Some(Self::Standard),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lite => "lite",
            Self::Standard => "standard",
            Self::Strict => "strict",
        }
    }
}

/// Category of a profile-routed check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckCategory {
    MissingRequired,
    UndefinedToken,
    IncompleteVariant,
    Accessibility,
}

/// What a profile does with a finding in some category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    Skip,
    Warn,
    Error,
}

/// Strictness verdict per check category for one profile.
///
/// Built once from the fixed table; profiles never mix within one
/// document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileTable {
    pub profile: Profile,
}

impl ProfileTable {
    pub fn for_profile(profile: Profile) -> Self {
        Self { profile }
    }

    /// Look up the verdict for a category under this profile.
    pub fn strictness(&self, category: CheckCategory) -> Strictness {
        use CheckCategory::*;
        use Strictness::*;
        match (self.profile, category) {
            (Profile::Lite, MissingRequired) => Warn,
            (Profile::Lite, _) => Skip,
            (Profile::Standard, MissingRequired) => Error,
            (Profile::Standard, _) => Warn,
            (Profile::Strict, _) => Error,
        }
    }

    /// Route a finding through the table: record it, drop it, or
    /// upgrade it, per the active profile.
    pub fn report(
        &self,
        category: CheckCategory,
        report: &mut DiagnosticReport,
        path: &str,
        rule_id: &str,
        message: impl Into<String>,
    ) {
        match self.strictness(category) {
            Strictness::Skip => {}
            Strictness::Warn => report.push(Severity::Warning, path, rule_id, message),
            Strictness::Error => report.push(Severity::Error, path, rule_id, message),
        }
    }
}

/// Resolve a document's declared profile against the run default.
///
/// Unknown profile strings fall back to the default rather than failing
/// the document.
pub fn resolve_profile(declared: Option<&str>, default: Profile) -> Profile {
    declared.and_then(Profile::parse).unwrap_or(default)
}
