//! Runs every wrapper check against one properties file.
//!
//! The file is read once. Merge-marker and duplicate-key checks look at the
//! raw text; everything else runs against the loaded [`PropertyMap`]. A
//! missing file fails `file_exists` and skips the rest. A file that is not
//! valid UTF-8 fails the two line-based checks, while the map is still loaded
//! as ISO-8859-1. A file that cannot be loaded fails every map-based check
//! with the loader error.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::checks::predicates;
use crate::checks::{CheckId, CheckOutcome};
use crate::errors::PropertiesError;
use crate::policy::AuditPolicy;
use crate::properties::{ConsistencyChecker, PropertyMap};
use crate::report::AuditReport;

/// Applies an [`AuditPolicy`] to wrapper properties files.
#[derive(Debug, Clone, Default)]
pub struct WrapperAuditor {
    policy: AuditPolicy,
}

impl WrapperAuditor {
    pub fn new(policy: AuditPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &AuditPolicy {
        &self.policy
    }

    /// Audit the policy's file, resolved against a project root.
    pub fn run_in(&self, root: &Path) -> AuditReport {
        let path = root.join(&self.policy.file);
        self.run(&path)
    }

    /// Audit the file at `path`.
    pub fn run(&self, path: &Path) -> AuditReport {
        let label = path.display().to_string();
        info!(path = %label, "auditing wrapper properties");

        if !path.exists() {
            warn!(path = %label, "properties file not found");
            return self.missing_file_report(&label);
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %label, error = %e, "failed to read properties file");
                let mut report = AuditReport::new(&label);
                report.push(CheckOutcome::pass(CheckId::FileExists));
                let reason = format!("could not read {}: {}", label, e);
                for id in &CheckId::ALL[1..] {
                    report.push(CheckOutcome::fail(*id, vec![reason.clone()]));
                }
                return report;
            }
        };

        match std::str::from_utf8(&bytes) {
            Ok(text) => self.run_text(&label, text),
            Err(e) => {
                warn!(path = %label, error = %e, "properties file is not valid UTF-8");
                let reason = format!("could not decode {} as UTF-8: {}", label, e);
                self.audit(&label, Err(reason), PropertyMap::parse_bytes(&bytes))
            }
        }
    }

    /// Audit already-read text. `label` names the file in messages.
    pub fn run_text(&self, label: &str, text: &str) -> AuditReport {
        self.audit(label, Ok(text), PropertyMap::parse(text))
    }

    /// `text` feeds the line-based checks, `loaded` the map-based ones.
    fn audit(
        &self,
        label: &str,
        text: Result<&str, String>,
        loaded: Result<PropertyMap, PropertiesError>,
    ) -> AuditReport {
        let mut report = AuditReport::new(label);
        report.push(CheckOutcome::pass(CheckId::FileExists));
        report.push(self.with_text(CheckId::NoMergeMarkers, &text, |text| {
            self.check_merge_markers(label, text)
        }));
        report.push(self.with_map(CheckId::RequiredKeys, &loaded, |map| {
            self.check_required_keys(map)
        }));
        report.push(self.with_text(CheckId::DuplicateKeysConsistent, &text, |text| {
            self.check_duplicates(label, text)
        }));
        report.push(self.with_map(CheckId::DistributionUrl, &loaded, |map| {
            self.check_distribution_url(map)
        }));
        report.push(self.with_map(CheckId::BooleanFlags, &loaded, |map| {
            self.check_boolean_flags(map)
        }));
        report.push(self.with_map(CheckId::NetworkTimeout, &loaded, |map| {
            self.check_network_timeout(map)
        }));
        report.push(self.with_map(CheckId::JvmArgsEncoding, &loaded, |map| {
            self.check_jvm_args(map)
        }));
        report.push(self.with_map(CheckId::ExpectedValues, &loaded, |map| {
            self.check_expected_values(map)
        }));

        let summary = report.summary();
        info!(
            passed = summary.passed,
            failed = summary.failed,
            "wrapper audit complete"
        );
        report
    }

    fn missing_file_report(&self, label: &str) -> AuditReport {
        let mut report = AuditReport::new(label);
        report.push(CheckOutcome::fail(
            CheckId::FileExists,
            vec![format!("{} must exist", label)],
        ));
        for id in &CheckId::ALL[1..] {
            report.push(CheckOutcome::skipped(*id, "file not found"));
        }
        report
    }

    fn with_text<F>(&self, id: CheckId, text: &Result<&str, String>, check: F) -> CheckOutcome
    where
        F: FnOnce(&str) -> Vec<String>,
    {
        let outcome = match text {
            Ok(text) => CheckOutcome::from_messages(id, check(*text)),
            Err(reason) => CheckOutcome::fail(id, vec![reason.clone()]),
        };
        log_outcome(&outcome);
        outcome
    }

    fn with_map<F>(
        &self,
        id: CheckId,
        loaded: &Result<PropertyMap, PropertiesError>,
        check: F,
    ) -> CheckOutcome
    where
        F: FnOnce(&PropertyMap) -> Vec<String>,
    {
        let outcome = match loaded {
            Ok(map) => CheckOutcome::from_messages(id, check(map)),
            Err(e) => CheckOutcome::fail(id, vec![format!("could not load properties: {}", e)]),
        };
        log_outcome(&outcome);
        outcome
    }

    // -----------------------------------------------------------------------
    // Individual checks
    // -----------------------------------------------------------------------

    fn check_merge_markers(&self, label: &str, text: &str) -> Vec<String> {
        predicates::find_merge_markers(text, &self.policy.merge_markers)
            .into_iter()
            .map(|hit| {
                let lines: Vec<String> = hit.lines.iter().map(|l| l.to_string()).collect();
                format!(
                    "Found '{}' merge marker in {} (line {})",
                    hit.marker,
                    label,
                    lines.join(", ")
                )
            })
            .collect()
    }

    fn check_duplicates(&self, label: &str, text: &str) -> Vec<String> {
        let conflicts = ConsistencyChecker::check_text(text);
        if conflicts.is_empty() {
            return Vec::new();
        }

        let mut messages = vec![format!(
            "Duplicate keys with differing values found in {}:",
            label
        )];
        messages.extend(conflicts.iter().map(|c| c.to_string()));
        messages
    }

    fn check_required_keys(&self, map: &PropertyMap) -> Vec<String> {
        predicates::missing_keys(map, &self.policy.required_keys)
            .into_iter()
            .map(|key| format!("Missing required property: {}", key))
            .collect()
    }

    fn check_distribution_url(&self, map: &PropertyMap) -> Vec<String> {
        let rule = &self.policy.distribution_url;
        match map.get(&rule.key) {
            Some(url) => predicates::check_distribution_url(url, rule),
            None => vec![format!("{} must be present", rule.key)],
        }
    }

    fn check_boolean_flags(&self, map: &PropertyMap) -> Vec<String> {
        self.policy
            .boolean_flags
            .iter()
            .filter_map(|key| match map.get(key) {
                None => Some(format!("Missing boolean property: {}", key)),
                Some(value) if predicates::parse_boolean_flag(value).is_none() => Some(format!(
                    "Property {} must be 'true' or 'false' but was: {}",
                    key, value
                )),
                Some(_) => None,
            })
            .collect()
    }

    fn check_network_timeout(&self, map: &PropertyMap) -> Vec<String> {
        let rule = &self.policy.network_timeout;
        match map.get(&rule.key) {
            None => vec![format!("{} must be present", rule.key)],
            Some(value) => match predicates::check_network_timeout(value, rule) {
                Ok(millis) => {
                    debug!(millis, "network timeout within bounds");
                    Vec::new()
                }
                Err(problem) => vec![problem],
            },
        }
    }

    fn check_jvm_args(&self, map: &PropertyMap) -> Vec<String> {
        let rule = &self.policy.jvm_args;
        match map.get(&rule.key) {
            None => vec![format!("{} must be present", rule.key)],
            Some(value) => predicates::missing_fragments(value, rule)
                .into_iter()
                .map(|fragment| format!("{} should include {}", rule.key, fragment))
                .collect(),
        }
    }

    fn check_expected_values(&self, map: &PropertyMap) -> Vec<String> {
        self.policy
            .expected_values
            .iter()
            .filter_map(|(key, expected)| predicates::check_expected_value(map, key, expected))
            .collect()
    }
}

fn log_outcome(outcome: &CheckOutcome) {
    if outcome.is_failure() {
        warn!(check = %outcome.id, problems = outcome.messages.len(), "check failed");
    } else {
        debug!(check = %outcome.id, "check passed");
    }
}
