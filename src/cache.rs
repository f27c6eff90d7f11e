//! Incremental token cache
//!
//! A resolved token graph can be reused across runs when none of its
//! contributing documents changed. The key is a combined SHA-256 over
//! the canonical JSON of every contributing document; any document
//! change produces a new key and invalidates the old snapshot. The
//! cache is read-only during a run and replaced wholesale between runs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::diagnostics::Diagnostic;
use crate::tokens::TokenGraph;

/// Content hash value object, `sha256:` prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    pub const PREFIX: &'static str = "sha256:";

    /// Hash one document's canonical JSON.
    pub fn from_content(content: &str) -> Self {
        use sha2::{Digest, Sha256};
        let hash = Sha256::digest(content.as_bytes());
        Self(format!("{}{:x}", Self::PREFIX, hash))
    }

    /// Combine the hashes of every contributing document into one key.
    ///
    /// Inputs are sorted first so document order cannot change the key.
    pub fn combine(parts: &[ContentHash]) -> Self {
        use sha2::{Digest, Sha256};
        let mut sorted: Vec<&str> = parts.iter().map(|h| h.as_str()).collect();
        sorted.sort_unstable();
        let mut hasher = Sha256::new();
        for part in sorted {
            hasher.update(part.as_bytes());
            hasher.update(b"\n");
        }
        Self(format!("{}{:x}", Self::PREFIX, hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cached resolved graph with its provenance
#[derive(Debug, Clone)]
pub struct CachedGraph {
    pub graph: TokenGraph,
    /// Diagnostics the resolution produced, replayed on a cache hit so
    /// a hit and a miss yield identical reports
    pub diagnostics: Vec<Diagnostic>,
    pub created_at: DateTime<Utc>,
}

/// Content-addressed store of resolved token graphs.
///
/// One run only reads it; the orchestrator inserts after resolution and
/// the whole map is swapped between runs, never mutated mid-run.
#[derive(Debug, Clone, Default)]
pub struct TokenGraphCache {
    entries: HashMap<ContentHash, CachedGraph>,
}

impl TokenGraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ContentHash) -> Option<&CachedGraph> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: ContentHash, graph: TokenGraph, diagnostics: Vec<Diagnostic>) {
        self.entries.insert(
            key,
            CachedGraph {
                graph,
                diagnostics,
                created_at: Utc::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
