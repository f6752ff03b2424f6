//! Shard table loading
//!
//! The documentation generator emits its search data as JavaScript files of
//! the form `var searchData = [...]`, one file per category/letter bucket.
//! Each row is `[escapedKey, [displayName, [url, flag, scopeLabel], ...]]`
//! and a row may carry several links when a name resolves to multiple
//! targets (overloads, specializations). One link becomes one record.
//!
//! The loader normalizes the generator's single-quoted JS literal to JSON,
//! parses it with serde_json, and keeps records raw; validation of required
//! fields happens when the index is built.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

lazy_static! {
    static ref PRELUDE: Regex = Regex::new(r"^\s*var\s+[A-Za-z_$][A-Za-z0-9_$]*\s*=").unwrap();
}

/// One raw, not-yet-validated search record from a shard file.
/// Empty `key` or `target_url` marks a malformed record; the index build
/// skips and counts those rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardRecord {
    pub key: String,
    pub display_name: String,
    pub target_url: String,
    /// Scope chain as a single `::`-separated label, as shipped
    pub scope_label: String,
}

/// One generator-emitted batch of search records, immutable after creation.
/// Shards with the same logical name across directory snapshots are
/// independent sources; merging them is the index's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardTable {
    /// Logical name, normally the file stem (`all_2`, `classes_3`, ...)
    pub name: String,
    pub records: Vec<ShardRecord>,
}

impl ShardTable {
    pub fn new(name: impl Into<String>, records: Vec<ShardRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

/// Load a single shard file from disk
pub fn load_shard_file(path: &Path) -> Result<ShardTable, ShardError> {
    let source = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("shard")
        .to_string();
    parse_shard(&name, &source)
}

/// Load every `*.js` shard in a generator search directory.
///
/// Files are loaded in name order so the resulting shard sequence (and with
/// it the index's tie-break ordering) is deterministic. Unreadable or
/// unparseable files are warned about and skipped; the well-formed majority
/// still loads.
pub fn load_search_dir(dir: &Path) -> Result<Vec<ShardTable>, ShardError> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("js"))
        .collect();
    paths.sort();

    let mut shards = Vec::new();
    for path in paths {
        match load_shard_file(&path) {
            Ok(shard) => shards.push(shard),
            Err(e) => {
                eprintln!("Failed to load shard {:?}: {}", path, e);
            }
        }
    }
    Ok(shards)
}

/// Parse one shard payload (`var searchData = [...]` or a bare array)
pub fn parse_shard(name: &str, source: &str) -> Result<ShardTable, ShardError> {
    let payload = match PRELUDE.find(source) {
        Some(prelude) => &source[prelude.end()..],
        None => source,
    };
    let payload = payload.trim().trim_end_matches(';').trim_end();
    if !payload.starts_with('[') {
        return Err(ShardError::BadFormat(format!(
            "shard '{}' does not contain a search data array",
            name
        )));
    }

    let value: Value = serde_json::from_str(&js_to_json(payload))?;
    let records = records_from_value(&value)?;
    Ok(ShardTable::new(name, records))
}

/// Rewrite the generator's single-quoted JS array literal as JSON. Only
/// string quoting differs between the two; structure passes through.
fn js_to_json(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len());
    let mut chars = payload.chars();
    while let Some(c) = chars.next() {
        if c != '\'' && c != '"' {
            out.push(c);
            continue;
        }
        let quote = c;
        out.push('"');
        loop {
            let c = match chars.next() {
                Some(c) => c,
                None => break,
            };
            if c == quote {
                break;
            }
            match c {
                '\\' => match chars.next() {
                    // \' is a JS-only escape; everything else survives
                    Some('\'') => out.push('\''),
                    Some('"') => out.push_str("\\\""),
                    Some('\\') => out.push_str("\\\\"),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => break,
                },
                '"' => out.push_str("\\\""),
                c if (c as u32) < 0x20 => {
                    out.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => out.push(c),
            }
        }
        out.push('"');
    }
    out
}

/// Flatten the parsed shard value into raw records. Rows that are not even
/// the right shape become empty records so the build-time diagnostic counts
/// them alongside rows with missing fields.
fn records_from_value(value: &Value) -> Result<Vec<ShardRecord>, ShardError> {
    let rows = value.as_array().ok_or_else(|| {
        ShardError::BadFormat("search data payload is not an array".to_string())
    })?;

    let mut records = Vec::new();
    for row in rows {
        let row = match row.as_array() {
            Some(row) => row,
            None => {
                records.push(ShardRecord::default());
                continue;
            }
        };
        let key = row
            .first()
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let group = match row.get(1).and_then(Value::as_array) {
            Some(group) => group,
            None => {
                records.push(ShardRecord {
                    key,
                    ..ShardRecord::default()
                });
                continue;
            }
        };
        let display_name =
            unescape_html(group.first().and_then(Value::as_str).unwrap_or(""));
        let links = group.get(1..).unwrap_or(&[]);
        if links.is_empty() {
            records.push(ShardRecord {
                key,
                display_name,
                ..ShardRecord::default()
            });
            continue;
        }
        for link in links {
            let link = link.as_array();
            let target_url = link
                .and_then(|l| l.first())
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            // link[1] is a presentation flag for the generator's own UI
            let scope_label = link
                .and_then(|l| l.get(2))
                .and_then(Value::as_str)
                .unwrap_or("");
            records.push(ShardRecord {
                key: key.clone(),
                display_name: display_name.clone(),
                target_url,
                scope_label: unescape_html(scope_label),
            });
        }
    }
    Ok(records)
}

/// Decode the HTML entities the generator leaves in display names
/// (`checker&lt; T &gt;` and friends). Unknown entities pass through.
pub fn unescape_html(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let end = match rest.find(';') {
            Some(end) if (2..=8).contains(&end) => end,
            _ => {
                out.push('&');
                rest = &rest[1..];
                continue;
            }
        };
        let replacement = match &rest[1..end] {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            candidate => match candidate.strip_prefix('#') {
                Some(num) => {
                    let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
                None => None,
            },
        };
        match replacement {
            Some(c) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Error type for shard loading
#[derive(Debug)]
pub enum ShardError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    BadFormat(String),
}

impl std::fmt::Display for ShardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShardError::Io(e) => write!(f, "IO error: {}", e),
            ShardError::Parse(e) => write!(f, "parse error: {}", e),
            ShardError::BadFormat(msg) => write!(f, "bad shard format: {}", msg),
        }
    }
}

impl std::error::Error for ShardError {}

impl From<std::io::Error> for ShardError {
    fn from(err: std::io::Error) -> Self {
        ShardError::Io(err)
    }
}

impl From<serde_json::Error> for ShardError {
    fn from(err: serde_json::Error) -> Self {
        ShardError::Parse(err)
    }
}
