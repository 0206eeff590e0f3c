//! End-to-end tests for auditing wrapper properties files on disk.
//!
//! Each test lays out a throwaway project under a `TempDir`, writes a
//! `gradle/wrapper/gradle-wrapper.properties` file and runs the real
//! `WrapperAuditor` against it.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use wrapperaudit_core::checks::{CheckId, CheckStatus};
use wrapperaudit_core::policy::AuditPolicy;
use wrapperaudit_core::properties::{ConsistencyChecker, PropertyMap};
use wrapperaudit_core::report::AuditReport;
use wrapperaudit_core::WrapperAuditor;

// ===========================================================================
// Helpers
// ===========================================================================

/// A wrapper file as `gradle wrapper` writes it, plus the flags the default
/// policy insists on.
const STOCK_PROPERTIES: &str = r#"#Thu Feb 01 10:00:00 UTC 2024
distributionBase=GRADLE_USER_HOME
distributionPath=wrapper/dists
distributionUrl=https\://services.gradle.org/distributions/gradle-8.7-bin.zip
networkTimeout=10000
validateDistributionUrl=true
zipStoreBase=GRADLE_USER_HOME
zipStorePath=wrapper/dists

# Build flags
org.gradle.configuration-cache=true
org.gradle.unsafe.configuration-cache=true
org.gradle.caching=true
org.gradle.vfs.watch=true
org.gradle.parallel=true
org.gradle.java.installations.auto-download=false
org.gradle.jvmargs=-Xmx4g \
    -XX:+UseParallelGC \
    -Dfile.encoding=UTF-8
"#;

fn write_project(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let wrapper_dir = dir.path().join("gradle").join("wrapper");
    std::fs::create_dir_all(&wrapper_dir).unwrap();
    let path = wrapper_dir.join("gradle-wrapper.properties");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

fn audit(root: &Path) -> AuditReport {
    WrapperAuditor::default().run_in(root)
}

fn status_of(report: &AuditReport, id: CheckId) -> CheckStatus {
    report
        .outcome(id)
        .map(|o| o.status)
        .unwrap_or_else(|| panic!("no outcome for {}", id))
}

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn test_stock_wrapper_file_is_clean() {
    let (dir, path) = write_project(STOCK_PROPERTIES);
    let report = audit(dir.path());

    assert!(report.is_clean(), "{:#?}", report.failures().collect::<Vec<_>>());
    assert_eq!(report.summary().passed, CheckId::ALL.len());
    assert_eq!(report.file, path.display().to_string());
}

#[test]
fn test_escaped_url_and_continued_jvmargs_are_loaded() {
    let (_dir, path) = write_project(STOCK_PROPERTIES);
    let map = PropertyMap::load(&path).unwrap();

    assert_eq!(
        map.get("distributionUrl"),
        Some("https://services.gradle.org/distributions/gradle-8.7-bin.zip")
    );
    assert_eq!(
        map.get("org.gradle.jvmargs"),
        Some("-Xmx4g -XX:+UseParallelGC -Dfile.encoding=UTF-8")
    );
}

#[test]
fn test_missing_file_reports_must_exist() {
    let dir = TempDir::new().unwrap();
    let report = audit(dir.path());

    assert!(!report.is_clean());
    let outcome = report.outcome(CheckId::FileExists).unwrap();
    assert_eq!(outcome.status, CheckStatus::Fail);
    assert!(outcome.messages[0].ends_with("gradle-wrapper.properties must exist"));
    assert_eq!(status_of(&report, CheckId::NetworkTimeout), CheckStatus::Skipped);
}

#[test]
fn test_unresolved_merge_is_flagged() {
    let merged = STOCK_PROPERTIES.replace(
        "networkTimeout=10000\n",
        "<<<<<<< HEAD\nnetworkTimeout=10000\n=======\nnetworkTimeout=60000\n>>>>>>> feature\n",
    );
    let (dir, _path) = write_project(&merged);
    let report = audit(dir.path());

    assert_eq!(status_of(&report, CheckId::NoMergeMarkers), CheckStatus::Fail);
    assert_eq!(
        status_of(&report, CheckId::DuplicateKeysConsistent),
        CheckStatus::Fail
    );

    // The `=======` line splits on `=` with an empty key, which is an entry
    // of its own and not a conflict.
    let conflicts = ConsistencyChecker::check_text(&merged);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].key, "networkTimeout");
    assert_eq!(conflicts[0].values, vec!["10000", "60000"]);
}

#[test]
fn test_insecure_distribution_url() {
    let text = STOCK_PROPERTIES.replace("https\\://", "http\\://");
    let (dir, _path) = write_project(&text);
    let report = audit(dir.path());

    let outcome = report.outcome(CheckId::DistributionUrl).unwrap();
    assert_eq!(outcome.status, CheckStatus::Fail);
    assert_eq!(
        outcome.messages,
        vec!["distributionUrl must start with https://services.gradle.org/distributions/"]
    );
}

#[test]
fn test_wrong_zip_store_values() {
    let text = STOCK_PROPERTIES
        .replace("zipStoreBase=GRADLE_USER_HOME", "zipStoreBase=PROJECT")
        .replace("zipStorePath=wrapper/dists", "zipStorePath=dists");
    let (dir, _path) = write_project(&text);
    let report = audit(dir.path());

    let outcome = report.outcome(CheckId::ExpectedValues).unwrap();
    assert_eq!(
        outcome.messages,
        vec![
            "zipStoreBase should be GRADLE_USER_HOME but was: PROJECT",
            "zipStorePath should be wrapper/dists but was: dists",
        ]
    );
}

#[test]
fn test_policy_file_relaxes_rules() {
    let (dir, _path) = write_project(
        "distributionBase=GRADLE_USER_HOME\n\
         distributionPath=wrapper/dists\n\
         distributionUrl=https\\://services.gradle.org/distributions/gradle-8.7-all.zip\n\
         zipStoreBase=GRADLE_USER_HOME\n\
         zipStorePath=wrapper/dists\n\
         networkTimeout=10000\n\
         org.gradle.jvmargs=-Dfile.encoding=UTF-8\n",
    );
    let policy_path = dir.path().join("wrapperaudit.toml");
    std::fs::write(&policy_path, "boolean_flags = []\n").unwrap();

    let strict = audit(dir.path());
    assert_eq!(status_of(&strict, CheckId::BooleanFlags), CheckStatus::Fail);

    let policy = AuditPolicy::load_and_validate(&policy_path).unwrap();
    let relaxed = WrapperAuditor::new(policy).run_in(dir.path());
    assert!(relaxed.is_clean(), "{:#?}", relaxed.failures().collect::<Vec<_>>());
}

#[test]
fn test_json_report_round_trips() {
    let (dir, _path) = write_project(STOCK_PROPERTIES);
    let report = audit(dir.path());

    let json = report.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["clean"], true);
    assert_eq!(value["summary"]["total"], CheckId::ALL.len());

    let parsed: AuditReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.outcomes, report.outcomes);
}
