//! Stateless predicates behind each check.
//!
//! Each function inspects one value (or the parsed map) and returns the
//! problems it found as human-readable messages naming the offending key.
//! An empty result means the predicate holds.

use crate::policy::{DistributionUrlRule, JvmArgsRule, NetworkTimeoutRule};
use crate::properties::loader::natural_lines;
use crate::properties::PropertyMap;

/// Where a merge marker occurs in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerHit {
    pub marker: String,
    /// 1-based line numbers containing the marker.
    pub lines: Vec<usize>,
}

/// Find every marker that occurs anywhere in `text`. Line numbers count
/// `\n`, `\r` and `\r\n` breaks.
pub fn find_merge_markers(text: &str, markers: &[String]) -> Vec<MarkerHit> {
    markers
        .iter()
        .filter(|marker| !marker.is_empty() && text.contains(marker.as_str()))
        .map(|marker| MarkerHit {
            marker: marker.clone(),
            lines: natural_lines(text)
                .into_iter()
                .enumerate()
                .filter(|(_, line)| line.contains(marker.as_str()))
                .map(|(idx, _)| idx + 1)
                .collect(),
        })
        .collect()
}

/// Required keys absent from `map`, in the order given.
pub fn missing_keys<'a>(map: &PropertyMap, required: &'a [String]) -> Vec<&'a str> {
    required
        .iter()
        .map(String::as_str)
        .filter(|key| !map.contains_key(key))
        .collect()
}

/// Check the distribution URL against its rule.
pub fn check_distribution_url(url: &str, rule: &DistributionUrlRule) -> Vec<String> {
    let mut problems = Vec::new();

    if !url.starts_with(&rule.prefix) {
        problems.push(format!("{} must start with {}", rule.key, rule.prefix));
    }
    if !url.ends_with(&rule.suffix) {
        problems.push(format!("{} must end with {}", rule.key, rule.suffix));
    }
    if !rule.flavors.is_empty() && !rule.flavors.iter().any(|f| url.contains(f.as_str())) {
        problems.push(format!(
            "{} should reference {}",
            rule.key,
            describe_flavors(&rule.flavors, &rule.suffix)
        ));
    }

    problems
}

/// `-bin.zip`, `-all.zip` reads as "either the bin or all distribution".
fn describe_flavors(flavors: &[String], suffix: &str) -> String {
    let names: Vec<&str> = flavors
        .iter()
        .map(|f| {
            let name = f.trim_start_matches('-');
            name.strip_suffix(suffix).unwrap_or(name)
        })
        .collect();
    match names.as_slice() {
        [one] => format!("the {} distribution", one),
        [a, b] => format!("either the {} or {} distribution", a, b),
        _ => format!("one of the {} distributions", names.join(", ")),
    }
}

/// Case-insensitive `true` / `false`.
pub fn parse_boolean_flag(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parse and bound-check a timeout in milliseconds.
pub fn check_network_timeout(value: &str, rule: &NetworkTimeoutRule) -> Result<i32, String> {
    let millis: i32 = value.parse().map_err(|_| {
        format!(
            "{} must be an integer number of milliseconds, but was: {}",
            rule.key, value
        )
    })?;

    if millis <= rule.min_exclusive {
        return Err(if rule.min_exclusive == 0 {
            format!("{} must be positive", rule.key)
        } else {
            format!("{} must be greater than {}", rule.key, rule.min_exclusive)
        });
    }
    if millis > rule.max_inclusive {
        return Err(format!(
            "{} seems excessively large (> {}): {}",
            rule.key,
            describe_millis(rule.max_inclusive),
            millis
        ));
    }

    Ok(millis)
}

/// Fragments from the rule that `value` does not contain.
pub fn missing_fragments<'a>(value: &str, rule: &'a JvmArgsRule) -> Vec<&'a str> {
    rule.required_fragments
        .iter()
        .map(String::as_str)
        .filter(|fragment| !value.contains(*fragment))
        .collect()
}

/// Compare a key against its pinned value.
pub fn check_expected_value(map: &PropertyMap, key: &str, expected: &str) -> Option<String> {
    match map.get(key) {
        None => Some(format!("{} must be present", key)),
        Some(actual) if actual != expected => Some(format!(
            "{} should be {} but was: {}",
            key, expected, actual
        )),
        Some(_) => None,
    }
}

fn describe_millis(ms: i32) -> String {
    let plural = |n: i32, unit: &str| {
        if n == 1 {
            format!("1 {}", unit)
        } else {
            format!("{} {}s", n, unit)
        }
    };
    if ms > 0 && ms % 60_000 == 0 {
        plural(ms / 60_000, "minute")
    } else if ms > 0 && ms % 1_000 == 0 {
        plural(ms / 1_000, "second")
    } else {
        format!("{} ms", ms)
    }
}
