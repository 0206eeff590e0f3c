//! Structured result of one audit run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checks::{CheckId, CheckOutcome, CheckStatus};

/// All check outcomes for one properties file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// The audited file, as given to the auditor.
    pub file: String,
    pub checked_at: DateTime<Utc>,
    pub outcomes: Vec<CheckOutcome>,
}

/// Outcome counts for a report.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl AuditReport {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            checked_at: Utc::now(),
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: CheckOutcome) {
        self.outcomes.push(outcome);
    }

    /// Outcome for a specific check, if it was recorded.
    pub fn outcome(&self, id: CheckId) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.id == id)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    /// `true` when no check failed. Skipped checks do not count as failures.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn summary(&self) -> AuditSummary {
        let mut summary = AuditSummary {
            total: self.outcomes.len(),
            ..AuditSummary::default()
        };
        for outcome in &self.outcomes {
            match outcome.status {
                CheckStatus::Pass => summary.passed += 1,
                CheckStatus::Fail => summary.failed += 1,
                CheckStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    /// Pretty-printed JSON, including the summary.
    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Document<'a> {
            #[serde(flatten)]
            report: &'a AuditReport,
            summary: AuditSummary,
            clean: bool,
        }

        serde_json::to_string_pretty(&Document {
            report: self,
            summary: self.summary(),
            clean: self.is_clean(),
        })
    }
}
