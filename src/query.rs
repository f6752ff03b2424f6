//! Structured search queries
//!
//! A thin layer over `SymbolIndex::query` for viewer UIs that want kind
//! filtering or a result cap on top of the plain ranked substring search.

use crate::entry::{Entry, EntryKind};
use crate::index::SymbolIndex;

/// Structured search query
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Text to match against keys and display names
    pub text: String,
    /// Restrict results to these kinds
    pub kinds: Option<Vec<EntryKind>>,
    /// Maximum results to return
    pub limit: Option<usize>,
}

impl SearchQuery {
    /// Create a simple text search query
    pub fn text(query: &str) -> Self {
        Self {
            text: query.to_string(),
            limit: Some(50),
            ..Default::default()
        }
    }

    /// Add a limit to the query
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add kind filter
    pub fn with_kinds(mut self, kinds: Vec<EntryKind>) -> Self {
        self.kinds = Some(kinds);
        self
    }
}

/// Execute a structured query against an index. Matching and ranking are
/// exactly those of `SymbolIndex::query`; filters apply afterwards so the
/// relative order of surviving results is unchanged.
pub fn execute_search<'a>(index: &'a SymbolIndex, query: &SearchQuery) -> Vec<&'a Entry> {
    let mut results = index.query(&query.text);

    if let Some(ref kinds) = query.kinds {
        results.retain(|entry| kinds.contains(&entry.kind));
    }
    if let Some(limit) = query.limit {
        results.truncate(limit);
    }
    results
}
