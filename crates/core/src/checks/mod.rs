//! The individual wrapper checks and the runner that applies them.
//!
//! - [`predicates`] -- pure functions over a single value or the parsed map.
//! - [`runner`] -- [`WrapperAuditor`], which reads the file once and turns
//!   every predicate into a [`CheckOutcome`].

pub mod predicates;
pub mod runner;

use serde::{Deserialize, Serialize};

pub use runner::WrapperAuditor;

// ---------------------------------------------------------------------------
// Check identity
// ---------------------------------------------------------------------------

/// Identifies one check. Variants are listed in execution order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    FileExists,
    NoMergeMarkers,
    RequiredKeys,
    DuplicateKeysConsistent,
    DistributionUrl,
    BooleanFlags,
    NetworkTimeout,
    JvmArgsEncoding,
    ExpectedValues,
}

impl CheckId {
    pub const ALL: [CheckId; 9] = [
        Self::FileExists,
        Self::NoMergeMarkers,
        Self::RequiredKeys,
        Self::DuplicateKeysConsistent,
        Self::DistributionUrl,
        Self::BooleanFlags,
        Self::NetworkTimeout,
        Self::JvmArgsEncoding,
        Self::ExpectedValues,
    ];

    /// One-line human description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::FileExists => "File exists at the expected path",
            Self::NoMergeMarkers => "No unresolved merge conflict markers present",
            Self::RequiredKeys => "Required wrapper properties are present",
            Self::DuplicateKeysConsistent => "Duplicate keys, if any, have identical values",
            Self::DistributionUrl => "distributionUrl is HTTPS, well-formed and references bin/all",
            Self::BooleanFlags => "Boolean flags are 'true' or 'false'",
            Self::NetworkTimeout => "networkTimeout is a bounded positive integer",
            Self::JvmArgsEncoding => "JVM arguments set an explicit file encoding",
            Self::ExpectedValues => "Pinned keys have their expected values",
        }
    }
}

impl std::fmt::Display for CheckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileExists => write!(f, "file_exists"),
            Self::NoMergeMarkers => write!(f, "no_merge_markers"),
            Self::RequiredKeys => write!(f, "required_keys"),
            Self::DuplicateKeysConsistent => write!(f, "duplicate_keys_consistent"),
            Self::DistributionUrl => write!(f, "distribution_url"),
            Self::BooleanFlags => write!(f, "boolean_flags"),
            Self::NetworkTimeout => write!(f, "network_timeout"),
            Self::JvmArgsEncoding => write!(f, "jvm_args_encoding"),
            Self::ExpectedValues => write!(f, "expected_values"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of running one check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
    /// Not run because a precondition (usually the file itself) is missing.
    Skipped,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Outcome of one check together with its failure (or skip) messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckOutcome {
    pub id: CheckId,
    pub status: CheckStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
}

impl CheckOutcome {
    pub fn pass(id: CheckId) -> Self {
        Self {
            id,
            status: CheckStatus::Pass,
            messages: Vec::new(),
        }
    }

    pub fn fail(id: CheckId, messages: Vec<String>) -> Self {
        Self {
            id,
            status: CheckStatus::Fail,
            messages,
        }
    }

    pub fn skipped(id: CheckId, reason: impl Into<String>) -> Self {
        Self {
            id,
            status: CheckStatus::Skipped,
            messages: vec![reason.into()],
        }
    }

    /// Pass when `messages` is empty, fail otherwise.
    pub fn from_messages(id: CheckId, messages: Vec<String>) -> Self {
        if messages.is_empty() {
            Self::pass(id)
        } else {
            Self::fail(id, messages)
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == CheckStatus::Fail
    }
}
