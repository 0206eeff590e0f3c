//! `java.util.Properties`-compatible loader.
//!
//! Gradle writes wrapper files through `Properties#store`, which escapes
//! characters such as `:` (`https\://services.gradle.org/...`). The direct
//! checks must see the unescaped values, so this loader follows the same
//! rules as `Properties#load`:
//!
//! - natural lines end at `\n`, `\r` or `\r\n`;
//! - `#` and `!` start comment lines, blank lines are ignored;
//! - a line ending in an odd number of backslashes continues onto the next
//!   one (leading whitespace of the continuation is dropped);
//! - the key ends at the first unescaped `=`, `:` or whitespace;
//! - `\t`, `\n`, `\r`, `\f` and `\uXXXX` escapes are decoded, any other
//!   escaped character stands for itself;
//! - when a key repeats, the last value wins.
//!
//! Files on disk that are not valid UTF-8 are decoded as ISO-8859-1, the
//! charset `Properties#load(InputStream)` assumes.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use crate::errors::PropertiesError;

/// Flat key/value view of a properties document, sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    entries: BTreeMap<String, String>,
}

impl PropertyMap {
    /// Parse a properties document.
    pub fn parse(text: &str) -> Result<Self, PropertiesError> {
        let mut entries = BTreeMap::new();

        for (line_no, logical) in logical_lines(text) {
            let (raw_key, raw_value) = split_key_value(&logical);
            let key = unescape(&raw_key, line_no)?;
            let value = unescape(&raw_value, line_no)?;
            if let Some(previous) = entries.insert(key.clone(), value) {
                debug!(key = %key, previous = %previous, line = line_no, "property overridden");
            }
        }

        Ok(Self { entries })
    }

    /// Parse raw file contents: UTF-8 when valid, ISO-8859-1 otherwise.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, PropertiesError> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::parse(text),
            Err(e) => {
                debug!(error = %e, "not UTF-8, decoding as ISO-8859-1");
                Self::parse(&decode_latin1(bytes))
            }
        }
    }

    /// Load and parse a properties file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PropertiesError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading properties file");

        if !path.exists() {
            return Err(PropertiesError::FileNotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        let map = Self::parse_bytes(&bytes)?;
        debug!(count = map.len(), "properties loaded");
        Ok(map)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Line handling
// ---------------------------------------------------------------------------

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

/// Every byte maps to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Split on `\n`, `\r` and `\r\n`.
pub(crate) fn natural_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += 1;
                if i < bytes.len() && bytes[i] == b'\n' {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Join continued lines and drop blanks and comments. Each logical line is
/// paired with the 1-based number of the natural line it starts on.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let natural = natural_lines(text);
    let mut out = Vec::new();
    let mut i = 0;

    while i < natural.len() {
        let line_no = i + 1;
        let first = natural[i].trim_start_matches(is_whitespace);
        i += 1;

        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            continue;
        }

        let mut logical = String::from(first);
        while ends_with_continuation(&logical) {
            logical.pop();
            match natural.get(i) {
                Some(next) => {
                    logical.push_str(next.trim_start_matches(is_whitespace));
                    i += 1;
                }
                None => break,
            }
        }
        out.push((line_no, logical));
    }
    out
}

/// Split a logical line into its still-escaped key and value.
fn split_key_value(line: &str) -> (String, String) {
    let chars: Vec<char> = line.chars().collect();
    let mut key_len = 0;
    let mut value_start = chars.len();
    let mut has_sep = false;
    let mut preceding_backslash = false;

    while key_len < chars.len() {
        let c = chars[key_len];
        if (c == '=' || c == ':') && !preceding_backslash {
            value_start = key_len + 1;
            has_sep = true;
            break;
        } else if is_whitespace(c) && !preceding_backslash {
            value_start = key_len + 1;
            break;
        }
        preceding_backslash = c == '\\' && !preceding_backslash;
        key_len += 1;
    }

    while value_start < chars.len() {
        let c = chars[value_start];
        if !is_whitespace(c) {
            if !has_sep && (c == '=' || c == ':') {
                has_sep = true;
            } else {
                break;
            }
        }
        value_start += 1;
    }

    let key: String = chars[..key_len].iter().collect();
    let value: String = chars[value_start.min(chars.len())..].iter().collect();
    (key, value)
}

/// Decode backslash escapes.
fn unescape(raw: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            break;
        };
        match escaped {
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'f' => out.push('\u{c}'),
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                let valid = hex.len() == 4 && hex.chars().all(|h| h.is_ascii_hexdigit());
                let code = valid
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .ok_or_else(|| PropertiesError::MalformedEscape {
                        line,
                        detail: format!("expected 4 hex digits, found '{}'", hex),
                    })?;
                // Lone surrogates cannot be represented in a Rust string.
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_properties() -> &'static str {
        "#Mon Jan 01 00:00:00 UTC 2024\n\
         distributionBase=GRADLE_USER_HOME\n\
         distributionPath=wrapper/dists\n\
         distributionUrl=https\\://services.gradle.org/distributions/gradle-8.7-bin.zip\n\
         networkTimeout=10000\n\
         validateDistributionUrl=true\n\
         zipStoreBase=GRADLE_USER_HOME\n\
         zipStorePath=wrapper/dists\n"
    }

    #[test]
    fn test_parse_wrapper_file() {
        let map = PropertyMap::parse(sample_properties()).unwrap();
        assert_eq!(map.len(), 7);
        assert_eq!(
            map.get("distributionUrl"),
            Some("https://services.gradle.org/distributions/gradle-8.7-bin.zip")
        );
        assert_eq!(map.get("networkTimeout"), Some("10000"));
        assert!(map.get("missing").is_none());
    }

    #[test]
    fn test_separators() {
        let map = PropertyMap::parse("a=1\nb:2\nc 3\nd = 4\ne\t:\t5\nf  =  = 6\n").unwrap();
        assert_eq!(map.get("a"), Some("1"));
        assert_eq!(map.get("b"), Some("2"));
        assert_eq!(map.get("c"), Some("3"));
        assert_eq!(map.get("d"), Some("4"));
        assert_eq!(map.get("e"), Some("5"));
        // Only one separator is consumed.
        assert_eq!(map.get("f"), Some("= 6"));
    }

    #[test]
    fn test_key_without_value() {
        let map = PropertyMap::parse("lonely\nempty=\n").unwrap();
        assert_eq!(map.get("lonely"), Some(""));
        assert_eq!(map.get("empty"), Some(""));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let map = PropertyMap::parse("# a=1\n! b=2\n   \n\t# c=3\nd=4\n").unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("d"), Some("4"));
    }

    #[test]
    fn test_trailing_whitespace_in_value_is_kept() {
        let map = PropertyMap::parse("k = value  \n").unwrap();
        assert_eq!(map.get("k"), Some("value  "));
    }

    #[test]
    fn test_line_continuation() {
        let text = "org.gradle.jvmargs=-Xmx2g \\\n    -Dfile.encoding=UTF-8\nnext=1\n";
        let map = PropertyMap::parse(text).unwrap();
        assert_eq!(
            map.get("org.gradle.jvmargs"),
            Some("-Xmx2g -Dfile.encoding=UTF-8")
        );
        assert_eq!(map.get("next"), Some("1"));
    }

    #[test]
    fn test_even_backslashes_do_not_continue() {
        let map = PropertyMap::parse("path=C:\\\\\nother=x\n").unwrap();
        assert_eq!(map.get("path"), Some("C:\\"));
        assert_eq!(map.get("other"), Some("x"));
    }

    #[test]
    fn test_comment_lines_do_not_continue() {
        let map = PropertyMap::parse("# comment \\\nkey=v\n").unwrap();
        assert_eq!(map.get("key"), Some("v"));
    }

    #[test]
    fn test_continuation_at_end_of_input() {
        let map = PropertyMap::parse("key=abc\\").unwrap();
        assert_eq!(map.get("key"), Some("abc"));
    }

    #[test]
    fn test_escaped_separator_in_key() {
        let map = PropertyMap::parse("a\\=b=c\nx\\ y=z\n").unwrap();
        assert_eq!(map.get("a=b"), Some("c"));
        assert_eq!(map.get("x y"), Some("z"));
    }

    #[test]
    fn test_escapes() {
        let map = PropertyMap::parse("k=tab\\there\\n\\u0041\\q\n").unwrap();
        assert_eq!(map.get("k"), Some("tab\there\nAq"));
    }

    #[test]
    fn test_malformed_unicode_escape() {
        let err = PropertyMap::parse("ok=1\nbad=\\u12G4\n").unwrap_err();
        assert!(matches!(err, PropertiesError::MalformedEscape { line: 2, .. }));

        let err = PropertyMap::parse("bad=\\u12").unwrap_err();
        assert!(matches!(err, PropertiesError::MalformedEscape { line: 1, .. }));
    }

    #[test]
    fn test_last_value_wins() {
        let map = PropertyMap::parse("k=1\nk=2\n").unwrap();
        assert_eq!(map.get("k"), Some("2"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_crlf_and_cr_line_endings() {
        let map = PropertyMap::parse("a=1\r\nb=2\rc=3").unwrap();
        assert_eq!(map.get("a"), Some("1"));
        assert_eq!(map.get("b"), Some("2"));
        assert_eq!(map.get("c"), Some("3"));
    }

    #[test]
    fn test_natural_lines() {
        assert_eq!(natural_lines("a\rb\r\nc\nd"), vec!["a", "b", "c", "d"]);
        assert_eq!(natural_lines("a\n\n"), vec!["a", ""]);
        assert!(natural_lines("").is_empty());
    }

    #[test]
    fn test_parse_bytes_falls_back_to_latin1() {
        let map = PropertyMap::parse_bytes(b"# caf\xe9\nname=caf\xe9\nk=v\n").unwrap();
        assert_eq!(map.get("name"), Some("caf\u{e9}"));
        assert_eq!(map.get("k"), Some("v"));

        let map = PropertyMap::parse_bytes("name=caf\u{e9}\n".as_bytes()).unwrap();
        assert_eq!(map.get("name"), Some("caf\u{e9}"));
    }

    #[test]
    fn test_iter_is_sorted() {
        let map = PropertyMap::parse("b=2\na=1\n").unwrap();
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradle-wrapper.properties");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_properties().as_bytes()).unwrap();

        let map = PropertyMap::load(&path).expect("load failed");
        assert_eq!(map.get("zipStorePath"), Some("wrapper/dists"));
    }

    #[test]
    fn test_file_not_found() {
        let result = PropertyMap::load("/nonexistent/gradle-wrapper.properties");
        assert!(matches!(result, Err(PropertiesError::FileNotFound(_))));
    }
}
