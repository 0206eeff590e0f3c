//! Text rendering for audit reports and property listings.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use wrapperaudit_core::properties::{ConflictRecord, PropertyMap};
use wrapperaudit_core::{AuditReport, CheckStatus};

use crate::style;

/// Render a report as the human-readable check list.
pub fn report_text(report: &AuditReport) -> String {
    let mut out = String::new();
    let title = format!("Wrapper audit: {}", report.file);

    out.push('\n');
    out.push_str(&style::title(&title));
    out.push('\n');
    out.push_str(&"═".repeat(title.chars().count()));
    out.push_str("\n\n");

    for outcome in &report.outcomes {
        let line = format!("{:<28}{}", outcome.id.to_string(), outcome.id.description());
        out.push_str(&format!("  {}\n", style::status_line(outcome.status, &line)));

        if outcome.status == CheckStatus::Fail {
            for message in &outcome.messages {
                out.push_str(&format!("      {}\n", message));
            }
        }
    }

    let summary = report.summary();
    out.push('\n');
    if report.is_clean() {
        out.push_str(&format!(
            "  {} All {} checks passed",
            console::style("✓").green().bold(),
            summary.passed
        ));
        if summary.skipped > 0 {
            out.push_str(&format!(" ({} skipped)", summary.skipped));
        }
        out.push('\n');
    } else {
        out.push_str(&format!(
            "  {} {} of {} checks failed ({} passed, {} skipped)\n",
            console::style("!").red().bold(),
            summary.failed,
            summary.total,
            summary.passed,
            summary.skipped
        ));
    }
    out
}

/// Render conflict records one per line.
pub fn conflicts_text(file: &str, conflicts: &[ConflictRecord]) -> String {
    if conflicts.is_empty() {
        return format!("No conflicting duplicate keys in {}\n", file);
    }

    let mut out = format!("Duplicate keys with differing values found in {}:\n", file);
    for conflict in conflicts {
        out.push_str(&format!("  {}\n", conflict));
    }
    out
}

/// Render the loaded properties as a table.
pub fn properties_table(map: &PropertyMap) -> String {
    if map.is_empty() {
        return style::muted("No properties found.");
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["KEY", "VALUE"]);
    for (key, value) in map.iter() {
        table.add_row(vec![key, value]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wrapperaudit_core::WrapperAuditor;

    #[test]
    fn test_report_lists_failure_messages() {
        console::set_colors_enabled(false);
        let report = WrapperAuditor::default().run_text("gw.properties", "networkTimeout=0\n");
        let text = report_text(&report);
        assert!(text.contains("Wrapper audit: gw.properties"));
        assert!(text.contains("Missing required property: distributionUrl"));
        assert!(text.contains("networkTimeout must be positive"));
        assert!(text.contains("checks failed"));
    }

    #[test]
    fn test_conflicts_text() {
        let conflicts = vec![ConflictRecord {
            key: "a".into(),
            values: vec!["1".into(), "2".into()],
        }];
        assert_eq!(
            conflicts_text("f", &conflicts),
            "Duplicate keys with differing values found in f:\n  a -> [1, 2]\n"
        );
        assert!(conflicts_text("f", &[]).starts_with("No conflicting"));
    }

    #[test]
    fn test_properties_table_contains_rows() {
        let map = PropertyMap::parse("zipStorePath=wrapper/dists\n").unwrap();
        let table = properties_table(&map);
        assert!(table.contains("zipStorePath"));
        assert!(table.contains("wrapper/dists"));
    }
}
