//! Duplicate-key consistency checking.
//!
//! A key may appear more than once in a properties file. That alone is not a
//! problem; it only becomes one when the occurrences disagree on the value.
//! [`ConsistencyChecker`] scans the raw lines, groups values by key and
//! reports every key that was given two or more distinct values.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::loader::natural_lines;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single `key<delim>value` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyEntry {
    /// 1-based line number in the source text.
    pub line: usize,
    pub key: String,
    pub value: String,
}

/// A key observed with more than one distinct value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub key: String,
    /// Distinct values in first-seen order.
    pub values: Vec<String>,
}

impl ConflictRecord {
    /// `true` if `value` is one of the observed values.
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

impl fmt::Display for ConflictRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> [{}]", self.key, self.values.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Checker
// ---------------------------------------------------------------------------

/// Stateless checker over the lines of a properties document.
pub struct ConsistencyChecker;

impl ConsistencyChecker {
    /// Extract every entry line, in order.
    ///
    /// Blank lines, `#` comments and lines with neither `=` nor `:` are
    /// skipped. The line is split at whichever delimiter comes first.
    pub fn scan_entries<I, S>(lines: I) -> Vec<PropertyEntry>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .enumerate()
            .filter_map(|(idx, raw)| {
                split_entry(raw.as_ref()).map(|(key, value)| PropertyEntry {
                    line: idx + 1,
                    key: key.to_string(),
                    value: value.to_string(),
                })
            })
            .collect()
    }

    /// Return the conflicting keys, ordered by the first line each key
    /// appeared on. An empty result means every repeated key is consistent.
    pub fn check<I, S>(lines: I) -> Vec<ConflictRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = Self::scan_entries(lines);
        info!(entries = entries.len(), "checking duplicate key consistency");

        let mut order: Vec<ConflictRecord> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            match index.get(&entry.key) {
                Some(&slot) => {
                    let record = &mut order[slot];
                    if !record.has_value(&entry.value) {
                        debug!(key = %entry.key, line = entry.line, "new value for repeated key");
                        record.values.push(entry.value);
                    }
                }
                None => {
                    index.insert(entry.key.clone(), order.len());
                    order.push(ConflictRecord {
                        key: entry.key,
                        values: vec![entry.value],
                    });
                }
            }
        }

        let conflicts: Vec<ConflictRecord> =
            order.into_iter().filter(|r| r.values.len() > 1).collect();

        for conflict in &conflicts {
            warn!(key = %conflict.key, values = ?conflict.values, "conflicting duplicate key");
        }
        conflicts
    }

    /// Convenience wrapper over [`check`](Self::check) for a whole document.
    /// Lines break at `\n`, `\r` or `\r\n`, as in the loader.
    pub fn check_text(text: &str) -> Vec<ConflictRecord> {
        Self::check(natural_lines(text))
    }
}

/// Split one line into `(key, value)`, or `None` if it is not an entry.
fn split_entry(raw: &str) -> Option<(&str, &str)> {
    let line = trim_control(raw);
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let idx = match (line.find('='), line.find(':')) {
        (Some(eq), Some(col)) => eq.min(col),
        (Some(eq), None) => eq,
        (None, Some(col)) => col,
        (None, None) => return None,
    };

    Some((trim_control(&line[..idx]), trim_control(&line[idx + 1..])))
}

/// Strips ASCII whitespace and control characters from both ends.
fn trim_control(s: &str) -> &str {
    s.trim_matches(|c: char| c <= ' ')
}
