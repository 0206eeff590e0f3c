//! TOML-based audit policy.
//!
//! The policy lists what the audit enforces: the file location, which keys
//! are required, which must be booleans, the distribution URL shape, the
//! `networkTimeout` bounds and any keys pinned to an exact value. Every
//! field has a default matching the stock Gradle wrapper conventions, so an
//! empty policy file (or no policy file at all) audits the usual rules.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::PolicyError;

// ---------------------------------------------------------------------------
// Top-level policy
// ---------------------------------------------------------------------------

/// Top-level audit policy loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditPolicy {
    /// Path of the properties file, relative to the project root.
    #[serde(default = "default_file")]
    pub file: PathBuf,

    /// Substrings that indicate an unresolved merge.
    #[serde(default = "default_merge_markers")]
    pub merge_markers: Vec<String>,

    /// Keys that must be present.
    #[serde(default = "default_required_keys")]
    pub required_keys: Vec<String>,

    /// Keys that must be present and hold `true` or `false`.
    #[serde(default = "default_boolean_flags")]
    pub boolean_flags: Vec<String>,

    #[serde(default)]
    pub distribution_url: DistributionUrlRule,

    #[serde(default)]
    pub network_timeout: NetworkTimeoutRule,

    #[serde(default)]
    pub jvm_args: JvmArgsRule,

    /// Keys pinned to an exact value.
    #[serde(default = "default_expected_values")]
    pub expected_values: BTreeMap<String, String>,
}

fn default_file() -> PathBuf {
    PathBuf::from("gradle/wrapper/gradle-wrapper.properties")
}
fn default_merge_markers() -> Vec<String> {
    strings(&["<<<<<<<", "=======", ">>>>>>>"])
}
fn default_required_keys() -> Vec<String> {
    strings(&[
        "distributionBase",
        "distributionPath",
        "distributionUrl",
        "zipStoreBase",
        "zipStorePath",
    ])
}
fn default_boolean_flags() -> Vec<String> {
    strings(&[
        "org.gradle.configuration-cache",
        "org.gradle.unsafe.configuration-cache",
        "org.gradle.caching",
        "org.gradle.vfs.watch",
        "org.gradle.parallel",
        "org.gradle.java.installations.auto-download",
        "validateDistributionUrl",
    ])
}
fn default_expected_values() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("zipStoreBase".to_string(), "GRADLE_USER_HOME".to_string()),
        ("zipStorePath".to_string(), "wrapper/dists".to_string()),
    ])
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            file: default_file(),
            merge_markers: default_merge_markers(),
            required_keys: default_required_keys(),
            boolean_flags: default_boolean_flags(),
            distribution_url: DistributionUrlRule::default(),
            network_timeout: NetworkTimeoutRule::default(),
            jvm_args: JvmArgsRule::default(),
            expected_values: default_expected_values(),
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Shape of the distribution download URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionUrlRule {
    #[serde(default = "default_url_key")]
    pub key: String,

    /// Required prefix (scheme and host included).
    #[serde(default = "default_url_prefix")]
    pub prefix: String,

    #[serde(default = "default_url_suffix")]
    pub suffix: String,

    /// At least one of these must appear in the URL.
    #[serde(default = "default_url_flavors")]
    pub flavors: Vec<String>,
}

fn default_url_key() -> String {
    "distributionUrl".into()
}
fn default_url_prefix() -> String {
    "https://services.gradle.org/distributions/".into()
}
fn default_url_suffix() -> String {
    ".zip".into()
}
fn default_url_flavors() -> Vec<String> {
    strings(&["-bin.zip", "-all.zip"])
}

impl Default for DistributionUrlRule {
    fn default() -> Self {
        Self {
            key: default_url_key(),
            prefix: default_url_prefix(),
            suffix: default_url_suffix(),
            flavors: default_url_flavors(),
        }
    }
}

/// Bounds for the wrapper download timeout, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTimeoutRule {
    #[serde(default = "default_timeout_key")]
    pub key: String,

    /// The value must be strictly greater than this.
    #[serde(default)]
    pub min_exclusive: i32,

    #[serde(default = "default_timeout_max")]
    pub max_inclusive: i32,
}

fn default_timeout_key() -> String {
    "networkTimeout".into()
}
fn default_timeout_max() -> i32 {
    600_000
}

impl Default for NetworkTimeoutRule {
    fn default() -> Self {
        Self {
            key: default_timeout_key(),
            min_exclusive: 0,
            max_inclusive: default_timeout_max(),
        }
    }
}

/// Fragments the JVM argument string must contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JvmArgsRule {
    #[serde(default = "default_jvm_key")]
    pub key: String,

    #[serde(default = "default_jvm_fragments")]
    pub required_fragments: Vec<String>,
}

fn default_jvm_key() -> String {
    "org.gradle.jvmargs".into()
}
fn default_jvm_fragments() -> Vec<String> {
    strings(&["-Dfile.encoding=UTF-8"])
}

impl Default for JvmArgsRule {
    fn default() -> Self {
        Self {
            key: default_jvm_key(),
            required_fragments: default_jvm_fragments(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl AuditPolicy {
    /// Load an [`AuditPolicy`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading audit policy");

        if !path.exists() {
            return Err(PolicyError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let policy: AuditPolicy =
            toml::from_str(&contents).map_err(|e| PolicyError::ParseError(e.to_string()))?;

        debug!("audit policy parsed successfully");
        Ok(policy)
    }

    /// Validate that the policy is internally coherent.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.file.as_os_str().is_empty() {
            return Err(PolicyError::InvalidValue {
                field: "file".into(),
                detail: "properties file path must not be empty".into(),
            });
        }
        if self.merge_markers.iter().any(|m| m.is_empty()) {
            return Err(PolicyError::InvalidValue {
                field: "merge_markers".into(),
                detail: "merge markers must not be empty strings".into(),
            });
        }
        if self.distribution_url.key.is_empty() {
            return Err(PolicyError::InvalidValue {
                field: "distribution_url.key".into(),
                detail: "distribution URL key must not be empty".into(),
            });
        }
        if self.network_timeout.key.is_empty() {
            return Err(PolicyError::InvalidValue {
                field: "network_timeout.key".into(),
                detail: "network timeout key must not be empty".into(),
            });
        }
        if self.network_timeout.min_exclusive >= self.network_timeout.max_inclusive {
            return Err(PolicyError::InvalidValue {
                field: "network_timeout".into(),
                detail: format!(
                    "min_exclusive ({}) must be below max_inclusive ({})",
                    self.network_timeout.min_exclusive, self.network_timeout.max_inclusive
                ),
            });
        }
        if self.jvm_args.key.is_empty() {
            return Err(PolicyError::InvalidValue {
                field: "jvm_args.key".into(),
                detail: "JVM args key must not be empty".into(),
            });
        }

        Ok(())
    }

    /// Convenience: load and validate in one call.
    pub fn load_and_validate<P: AsRef<Path>>(path: P) -> Result<Self, PolicyError> {
        let policy = Self::load_from_file(path)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Commented policy template with every default spelled out.
    pub fn default_toml() -> &'static str {
        DEFAULT_POLICY_TOML
    }
}

const DEFAULT_POLICY_TOML: &str = r#"# wrapperaudit policy
# Every setting is optional; omitted values fall back to these defaults.

file = "gradle/wrapper/gradle-wrapper.properties"
merge_markers = ["<<<<<<<", "=======", ">>>>>>>"]

required_keys = [
    "distributionBase",
    "distributionPath",
    "distributionUrl",
    "zipStoreBase",
    "zipStorePath",
]

boolean_flags = [
    "org.gradle.configuration-cache",
    "org.gradle.unsafe.configuration-cache",
    "org.gradle.caching",
    "org.gradle.vfs.watch",
    "org.gradle.parallel",
    "org.gradle.java.installations.auto-download",
    "validateDistributionUrl",
]

[distribution_url]
key = "distributionUrl"
prefix = "https://services.gradle.org/distributions/"
suffix = ".zip"
flavors = ["-bin.zip", "-all.zip"]

[network_timeout]
key = "networkTimeout"
min_exclusive = 0
max_inclusive = 600000

[jvm_args]
key = "org.gradle.jvmargs"
required_fragments = ["-Dfile.encoding=UTF-8"]

[expected_values]
zipStoreBase = "GRADLE_USER_HOME"
zipStorePath = "wrapper/dists"
"#;
