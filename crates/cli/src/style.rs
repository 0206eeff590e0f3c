//! Terminal styling for audit output.

use console::{style, Style};

use wrapperaudit_core::CheckStatus;

/// Prefix `msg` with the glyph for `status`: green ✓, red ✗ or a dim ○.
/// Skipped lines are dimmed as a whole.
pub fn status_line(status: CheckStatus, msg: &str) -> String {
    let (glyph, paint) = match status {
        CheckStatus::Pass => ("✓", Style::new().green()),
        CheckStatus::Fail => ("✗", Style::new().red()),
        CheckStatus::Skipped => ("○", Style::new().dim()),
    };
    match status {
        CheckStatus::Skipped => format!("{} {}", paint.apply_to(glyph), paint.apply_to(msg)),
        _ => format!("{} {}", paint.apply_to(glyph), msg),
    }
}

pub fn title(msg: &str) -> String {
    style(msg).bold().to_string()
}

pub fn muted(msg: &str) -> String {
    style(msg).dim().to_string()
}
