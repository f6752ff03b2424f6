//! Symbol index construction and lookup
//!
//! Merges any number of shard tables into one de-duplicated, read-only
//! index and answers incremental (as-you-type) substring queries against
//! it. Building is a single pass over all records and performs no I/O;
//! after `build` the index is immutable and freely shareable.

use serde::Serialize;
use std::collections::HashMap;

use crate::entry::{Entry, EntryKey, EntryKind};
use crate::shard::ShardTable;

/// Diagnostic summary returned alongside a built index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Distinct entries in the index
    pub entries: usize,
    /// Records skipped for missing a key or target URL
    pub skipped: usize,
    /// Records collapsed into an already-present identical entry
    pub duplicates_merged: usize,
}

/// De-duplicated aggregation of shard records, read-only after `build`
pub struct SymbolIndex {
    entries: Vec<Entry>,
    by_identity: HashMap<EntryKey, usize>,
}

impl SymbolIndex {
    /// Build an index from a set of shard tables.
    ///
    /// Identical `(key, scope, target_url)` tuples collapse to a single
    /// entry, so feeding the same shard twice (or overlapping snapshots of
    /// the same logical shard) changes nothing. The same key and scope with
    /// a different URL is a genuine overload and every variant is kept.
    /// Records missing a key or URL are skipped and counted, never fatal;
    /// zero valid records yields a valid empty index.
    pub fn build(shards: &[ShardTable]) -> (Self, BuildReport) {
        let mut index = Self {
            entries: Vec::new(),
            by_identity: HashMap::new(),
        };
        let mut report = BuildReport::default();

        for shard in shards {
            let shard_kind = EntryKind::from_shard_name(&shard.name);
            for record in &shard.records {
                if record.key.is_empty() || record.target_url.is_empty() {
                    report.skipped += 1;
                    continue;
                }
                let identity = EntryKey {
                    key: record.key.clone(),
                    scope: split_scope(&record.scope_label),
                    target_url: record.target_url.clone(),
                };
                if let Some(&position) = index.by_identity.get(&identity) {
                    report.duplicates_merged += 1;
                    // A categorized shard knows more than a mixed one
                    if index.entries[position].kind == EntryKind::Other
                        && shard_kind != EntryKind::Other
                    {
                        index.entries[position].kind = shard_kind;
                    }
                    continue;
                }
                let display_name = if record.display_name.is_empty() {
                    record.key.clone()
                } else {
                    record.display_name.clone()
                };
                index.entries.push(Entry {
                    key: identity.key.clone(),
                    display_name,
                    target_url: identity.target_url.clone(),
                    scope: identity.scope.clone(),
                    kind: shard_kind,
                });
                index.by_identity.insert(identity, index.entries.len() - 1);
            }
        }

        report.entries = index.entries.len();
        (index, report)
    }

    /// Substring search over keys and display names, ranked for
    /// as-you-type use.
    ///
    /// Matching is case-insensitive. Exact-prefix matches on the display
    /// name rank above other substring matches; within a tier a shorter
    /// display name (the more specific symbol) ranks first, and ties keep
    /// insertion order. The empty query matches nothing rather than
    /// dumping the whole index.
    pub fn query(&self, text: &str) -> Vec<&Entry> {
        if text.is_empty() {
            return Vec::new();
        }
        let needle = text.to_lowercase();

        let mut hits: Vec<(u8, usize, usize)> = Vec::new();
        for (position, entry) in self.entries.iter().enumerate() {
            if let Some(tier) = match_tier(entry, &needle) {
                hits.push((tier, entry.display_name.len(), position));
            }
        }
        hits.sort_unstable();
        hits.into_iter()
            .map(|(_, _, position)| &self.entries[position])
            .collect()
    }

    /// Exact lookup by identity tuple, for deep-linking and
    /// back-navigation. Absent tuples are `None`, never a panic.
    pub fn get(&self, key: &str, scope: &[String], target_url: &str) -> Option<&Entry> {
        let identity = EntryKey {
            key: key.to_string(),
            scope: scope.to_vec(),
            target_url: target_url.to_string(),
        };
        self.by_identity
            .get(&identity)
            .map(|&position| &self.entries[position])
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ranking tier for a candidate entry: 0 for a display-name prefix match,
/// 1 for any other substring match, None for no match. `needle` must
/// already be lowercased.
fn match_tier(entry: &Entry, needle: &str) -> Option<u8> {
    let display = entry.display_name.to_lowercase();
    if display.starts_with(needle) {
        return Some(0);
    }
    if display.contains(needle) || entry.key.to_lowercase().contains(needle) {
        return Some(1);
    }
    None
}

/// Split a shipped scope label on its `::` separator. The label is
/// otherwise opaque; no template or signature parsing happens here.
fn split_scope(label: &str) -> Vec<String> {
    if label.trim().is_empty() {
        return Vec::new();
    }
    label
        .split("::")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shard::ShardRecord;

    fn record(key: &str, display: &str, url: &str) -> ShardRecord {
        ShardRecord {
            key: key.to_string(),
            display_name: display.to_string(),
            target_url: url.to_string(),
            scope_label: String::new(),
        }
    }

    fn shard(name: &str, records: Vec<ShardRecord>) -> ShardTable {
        ShardTable::new(name, records)
    }

    #[test]
    fn test_build_empty_input_yields_queryable_empty_index() {
        let (index, report) = SymbolIndex::build(&[]);

        assert!(index.is_empty());
        assert_eq!(report, BuildReport::default());
        assert!(index.query("anything").is_empty());
    }

    #[test]
    fn test_build_collapses_identical_tuples() {
        let s1 = shard("all_0", vec![record("identity", "identity", "/c.html")]);
        let s2 = shard("all_0", vec![record("identity", "identity", "/c.html")]);

        let (index, report) = SymbolIndex::build(&[s1, s2]);

        assert_eq!(index.len(), 1);
        assert_eq!(report.entries, 1);
        assert_eq!(report.duplicates_merged, 1);
    }

    #[test]
    fn test_build_keeps_overloads_with_different_urls() {
        let s = shard(
            "functions_0",
            vec![
                record("check", "check", "/checkers.html#a1"),
                record("check", "check", "/checkers.html#a2"),
            ],
        );

        let (index, report) = SymbolIndex::build(&[s]);

        assert_eq!(index.len(), 2);
        assert_eq!(report.duplicates_merged, 0);
    }

    #[test]
    fn test_build_skips_and_counts_malformed_records() {
        let s = shard(
            "all_0",
            vec![
                record("good", "good", "/good.html"),
                record("no_url", "no_url", ""),
                record("", "no_key", "/orphan.html"),
            ],
        );

        let (index, report) = SymbolIndex::build(&[s]);

        assert_eq!(report.skipped, 2);
        assert_eq!(index.len(), 1);
        assert_eq!(index.query("good").len(), 1);
    }

    #[test]
    fn test_build_is_idempotent_over_duplicate_shards() {
        let s = shard(
            "all_0",
            vec![
                record("checker", "checker", "/a.html"),
                record("connectivity", "connectivity", "/b.html"),
            ],
        );

        let (once, _) = SymbolIndex::build(&[s.clone()]);
        let (twice, _) = SymbolIndex::build(&[s.clone(), s]);

        for q in ["check", "conn", "c", "zzz"] {
            let a: Vec<_> = once.query(q);
            let b: Vec<_> = twice.query(q);
            assert_eq!(a, b, "query {:?} differs between [S] and [S, S]", q);
        }
    }

    #[test]
    fn test_categorized_shard_refines_kind_of_mixed_duplicate() {
        let mixed = shard("all_0", vec![record("checker", "checker", "/a.html")]);
        let typed = shard("classes_0", vec![record("checker", "checker", "/a.html")]);

        let (index, _) = SymbolIndex::build(&[mixed, typed]);

        assert_eq!(index.len(), 1);
        assert_eq!(index.entries()[0].kind, EntryKind::Type);
    }

    #[test]
    fn test_query_prefix_ranks_above_substring() {
        let s = shard(
            "all_0",
            vec![
                record("recheck", "recheck", "/r.html"),
                record("checker", "checker", "/a.html"),
            ],
        );
        let (index, _) = SymbolIndex::build(&[s]);

        let results = index.query("check");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].display_name, "checker");
        assert_eq!(results[1].display_name, "recheck");
    }

    #[test]
    fn test_query_shorter_display_name_ranks_first_within_tier() {
        let s = shard(
            "all_0",
            vec![
                record("checker_selector", "checker_selector", "/b.html"),
                record("checker", "checker", "/a.html"),
            ],
        );
        let (index, _) = SymbolIndex::build(&[s]);

        let results = index.query("check");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].display_name, "checker");
        assert_eq!(results[1].display_name, "checker_selector");
    }

    #[test]
    fn test_query_ties_keep_insertion_order() {
        let s = shard(
            "all_0",
            vec![
                record("alpha_x", "alpha_x", "/1.html"),
                record("alpha_y", "alpha_y", "/2.html"),
            ],
        );
        let (index, _) = SymbolIndex::build(&[s]);

        let results = index.query("alpha");

        assert_eq!(results[0].target_url, "/1.html");
        assert_eq!(results[1].target_url, "/2.html");
    }

    #[test]
    fn test_query_is_case_insensitive_and_matches_key_too() {
        let s = shard(
            "all_0",
            vec![record("vec_3c_20t_20_3e", "Vec< T >", "/vec.html")],
        );
        let (index, _) = SymbolIndex::build(&[s]);

        assert_eq!(index.query("VEC").len(), 1);
        assert_eq!(index.query("_3c_").len(), 1);
        assert!(index.query("absent").is_empty());
    }

    #[test]
    fn test_query_empty_returns_nothing() {
        let s = shard("all_0", vec![record("checker", "checker", "/a.html")]);
        let (index, _) = SymbolIndex::build(&[s]);

        assert!(index.query("").is_empty());
    }

    #[test]
    fn test_query_never_fails_on_unusual_punctuation() {
        let s = shard("all_0", vec![record("op", "operator<<", "/op.html")]);
        let (index, _) = SymbolIndex::build(&[s]);

        assert_eq!(index.query("operator<<").len(), 1);
        assert!(index.query("\"\\[]{}").is_empty());
        assert!(index.query("日本語").is_empty());
    }

    #[test]
    fn test_get_round_trips_every_entry() {
        let mut with_scope = record("checker", "checker", "/a.html");
        with_scope.scope_label = "sequoia::unit_testing".to_string();
        let s = shard(
            "all_0",
            vec![with_scope, record("connectivity", "connectivity", "/b.html")],
        );
        let (index, _) = SymbolIndex::build(&[s]);

        for entry in index.entries() {
            let found = index.get(&entry.key, &entry.scope, &entry.target_url);
            assert_eq!(found, Some(entry));
        }
    }

    #[test]
    fn test_get_absent_tuple_is_none() {
        let s = shard("all_0", vec![record("checker", "checker", "/a.html")]);
        let (index, _) = SymbolIndex::build(&[s]);

        assert!(index.get("checker", &[], "/elsewhere.html").is_none());
        assert!(index
            .get("checker", &["wrong".to_string()], "/a.html")
            .is_none());
    }

    #[test]
    fn test_scope_label_splits_on_separator() {
        let mut rec = record("checker", "checker", "/a.html");
        rec.scope_label = "sequoia::unit_testing".to_string();
        let (index, _) = SymbolIndex::build(&[shard("classes_0", vec![rec])]);

        assert_eq!(
            index.entries()[0].scope,
            vec!["sequoia".to_string(), "unit_testing".to_string()]
        );
    }
}
