//! Symbol search index for generated documentation
//!
//! A documentation generator ships its search data as many small shard
//! files, each mapping escaped symbol names to hyperlinked documentation
//! entries. This crate loads those shards, merges them into one
//! de-duplicated in-memory index, and answers ranked as-you-type substring
//! queries for a viewer UI.
//!
//! The index is built once per session and is read-only afterwards, so a
//! shared reference can serve any number of concurrent queries without
//! locking. Rendering, keystroke debouncing, and navigation belong to the
//! caller.

mod entry;
mod index;
mod query;
mod shard;

pub use entry::{Entry, EntryKey, EntryKind};
pub use index::{BuildReport, SymbolIndex};
pub use query::{execute_search, SearchQuery};
pub use shard::{
    load_search_dir, load_shard_file, parse_shard, unescape_html, ShardError, ShardRecord,
    ShardTable,
};
