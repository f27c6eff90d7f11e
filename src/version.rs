//! Version gate
//!
//! Each document declares `dcf_version` as a strict `MAJOR.MINOR.PATCH`
//! triple. Major mismatch excludes the document from the run; a newer
//! minor downgrades unrecognized fields to a warning; patch differences
//! are silent.

use crate::diagnostics::{rule, DiagnosticReport, Severity};

/// Format version this engine implements
pub const SUPPORTED_VERSION: SemVer = SemVer {
    major: 1,
    minor: 4,
    patch: 0,
};

/// A parsed `MAJOR.MINOR.PATCH` triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemVer {
    /// Parse a strict semver triple. No pre-release or build suffixes.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('.');
        let major = parse_component(parts.next()?)?;
        let minor = parse_component(parts.next()?)?;
        let patch = parse_component(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            major,
            minor,
            patch,
        })
    }
}

fn parse_component(s: &str) -> Option<u64> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl std::fmt::Display for SemVer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Outcome of gating one document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// Document proceeds through the pipeline
    Accepted,
    /// Document proceeds, but fields unknown to this engine are ignored
    AcceptedMinorAhead,
    /// Document is excluded from the run
    Rejected,
}

impl GateVerdict {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, GateVerdict::Rejected)
    }
}

/// Gate a document's declared version against [`SUPPORTED_VERSION`].
///
/// Fatal verdicts (malformed string, major mismatch) are reported as
/// errors regardless of profile.
pub fn gate(declared: &str, path: &str, report: &mut DiagnosticReport) -> GateVerdict {
    let version = match SemVer::parse(declared) {
        Some(v) => v,
        None => {
            report.push(
                Severity::Error,
                path,
                rule::MALFORMED_VERSION,
                format!("'{declared}' is not a MAJOR.MINOR.PATCH version"),
            );
            return GateVerdict::Rejected;
        }
    };

    if version.major != SUPPORTED_VERSION.major {
        report.push(
            Severity::Error,
            path,
            rule::INCOMPATIBLE_MAJOR,
            format!(
                "document requires major version {}, engine supports {}",
                version.major, SUPPORTED_VERSION
            ),
        );
        return GateVerdict::Rejected;
    }

    if version.minor > SUPPORTED_VERSION.minor {
        report.push(
            Severity::Warning,
            path,
            rule::UNKNOWN_MINOR_FIELDS,
            format!(
                "document declares {declared}, newer than supported {}; unrecognized fields will be ignored",
                SUPPORTED_VERSION
            ),
        );
        return GateVerdict::AcceptedMinorAhead;
    }

    GateVerdict::Accepted
}
