//! Plain-text rendering of a [`Profile`].
//!
//! Produces the table printed after a run: a header with run totals, the
//! per-key statistics and a bar chart of the hot spans. The caller decides
//! where the text goes.

use super::schema::Profile;
use crate::utils::config::{SUMMARY_BAR_WIDTH, SUMMARY_NAME_WIDTH};

/// Create a text summary with a per-key table and hot span bars
///
/// # Arguments
/// * `profile` - Profile to render
/// * `max_lines` - Maximum number of per-key rows
pub fn generate_text_summary(profile: &Profile, max_lines: usize) -> String {
    let mut lines = Vec::new();

    lines.push(format!("  Total: {}", profile.total_spans));
    lines.push(format!("  Total top-level: {}", profile.top_level_spans));
    lines.push(format!("  Total time: {:.3}ms", profile.tracked_time_ms));
    lines.push(format!("  Total uniq keys: {}", profile.unique_keys));
    lines.push(String::new());

    let rule = "━".repeat(SUMMARY_NAME_WIDTH + 2);
    let cell = "━".repeat(14);
    lines.push(format!("  ┏{rule}┳{cell}┳{cell}┳{cell}┳{cell}┳{cell}┓"));
    lines.push(format!(
        "  ┃ {:<width$} ┃ {:^12} ┃ {:^12} ┃ {:^12} ┃ {:^12} ┃ {:^12} ┃",
        "Span",
        "TOTAL",
        "TOP-LEVEL",
        "TIME (ms)",
        "PER CALL",
        "TOP (ms)",
        width = SUMMARY_NAME_WIDTH
    ));
    lines.push(format!("  ┣{rule}╋{cell}╋{cell}╋{cell}╋{cell}╋{cell}┫"));

    for row in profile.stats.iter().take(max_lines) {
        lines.push(format!(
            "  ┃ {:<width$} ┃ {:>12} ┃ {:>12} ┃ {:>12.3} ┃ {:>12.3} ┃ {:>12.3} ┃",
            truncate_name(&row.name),
            row.total,
            row.top_level,
            row.total_time_ms,
            row.time_per_call_ms,
            row.top_level_time_ms,
            width = SUMMARY_NAME_WIDTH
        ));
    }

    lines.push(format!("  ┗{rule}┻{cell}┻{cell}┻{cell}┻{cell}┻{cell}┛"));

    if profile.stats.len() > max_lines {
        lines.push(format!(
            "   (Showing top {} of {} keys)",
            max_lines,
            profile.stats.len()
        ));
    }

    if !profile.hot_spans.is_empty() {
        lines.push(String::new());
        lines.push("  HOT SPANS".to_string());

        for span in &profile.hot_spans {
            // Nested time can exceed the tracked total
            let share = span.percentage.min(100.0);
            let bar_width = (share / 100.0 * SUMMARY_BAR_WIDTH as f64) as usize;

            lines.push(format!(
                "  └─ {:<20} {:<bar$} {:>6.1}%",
                truncate_to(&span.name, 20),
                "█".repeat(bar_width),
                span.percentage,
                bar = SUMMARY_BAR_WIDTH
            ));
        }
    }

    lines.join("\n")
}

fn truncate_name(name: &str) -> String {
    truncate_to(name, SUMMARY_NAME_WIDTH)
}

/// Long names keep their tail
fn truncate_to(name: &str, width: usize) -> String {
    let chars = name.chars().count();
    if chars <= width {
        return name.to_string();
    }

    let tail: String = name.chars().skip(chars - (width - 3)).collect();
    format!("...{}", tail)
}
