//! Search entry types
//!
//! An `Entry` is one resolvable (symbol name, documentation link) pair as
//! shipped by the documentation generator. Entries are plain data; all
//! matching and ranking logic lives in the index.

use serde::{Deserialize, Serialize};

/// Declaration kind of an indexed symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Type,
    Function,
    Variable,
    File,
    Concept,
    Other,
}

impl EntryKind {
    /// Default kind for a shard's records, derived from the shard's logical
    /// name. The generator splits its output by category (`classes_3`,
    /// `functions_2`, ...); the mixed `all_*` buckets carry no kind signal.
    pub fn from_shard_name(name: &str) -> Self {
        let category = name.split(['_', '.']).next().unwrap_or("");
        match category {
            "classes" | "namespaces" | "typedefs" | "enums" => EntryKind::Type,
            "functions" | "defines" => EntryKind::Function,
            "variables" | "enumvalues" | "properties" => EntryKind::Variable,
            "files" => EntryKind::File,
            "pages" | "groups" | "concepts" => EntryKind::Concept,
            _ => EntryKind::Other,
        }
    }
}

/// One searchable documentation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Raw searchable label; may contain escaped template/operator
    /// punctuation. Treated as an opaque string.
    pub key: String,
    /// Human-readable label shown to the user
    pub display_name: String,
    /// Relative documentation link, optionally with a `#fragment` anchor
    pub target_url: String,
    /// Enclosing namespace/class chain, outermost first
    pub scope: Vec<String>,
    pub kind: EntryKind,
}

impl Entry {
    /// The tuple that identifies this entry within an index. Two entries
    /// with the same identity are the same entry; same key and scope with a
    /// different URL is a genuine overload.
    pub fn identity(&self) -> EntryKey {
        EntryKey {
            key: self.key.clone(),
            scope: self.scope.clone(),
            target_url: self.target_url.clone(),
        }
    }
}

/// Exact-lookup identity of an entry: (key, scope, target_url)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryKey {
    pub key: String,
    pub scope: Vec<String>,
    pub target_url: String,
}
