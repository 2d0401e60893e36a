use unicode_width::UnicodeWidthStr;

use crate::ops::stats::{GroupBy, Stat, StatsReport};

const BAR_WIDTH: usize = 20;
const BAR_FILLED: char = '█';
const BAR_EMPTY: char = '░';

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Percentage bar, `BAR_WIDTH` cells wide
pub fn format_bar(stat: &Stat) -> String {
    let filled = ((stat.percentage() / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let mut bar = String::with_capacity(BAR_WIDTH * 3);
    bar.extend(std::iter::repeat_n(BAR_FILLED, filled));
    bar.extend(std::iter::repeat_n(BAR_EMPTY, BAR_WIDTH - filled));
    bar
}

/// Pad `text` with spaces to `width` terminal columns
fn pad(text: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(w)))
}

fn format_row(label: &str, label_w: usize, count_w: usize, stat: &Stat) -> String {
    let counts = format!("{}/{}", stat.attended, stat.total);
    format!(
        " {}  {:>6.1}%  {:>count_w$}  {}",
        pad(label, label_w),
        stat.percentage(),
        counts,
        format_bar(stat),
        count_w = count_w,
    )
}

/// Plain-text stats table: one row per group, then the overall row
pub fn format_stats_report(report: &StatsReport) -> String {
    let title = match report.group_by {
        GroupBy::Subject => "Subject-wise attendance",
        GroupBy::Weekday => "Weekday-wise attendance",
    };

    let label_w = report
        .groups
        .iter()
        .map(|g| UnicodeWidthStr::width(g.key.as_str()))
        .max()
        .unwrap_or(0)
        .max(7); // "Overall"
    let count_w = report
        .groups
        .iter()
        .map(|g| &g.stat)
        .chain(std::iter::once(&report.overall))
        .map(|s| format!("{}/{}", s.attended, s.total).len())
        .max()
        .unwrap_or(0);

    let mut lines = vec![format!(" {}", title), String::new()];
    for group in &report.groups {
        lines.push(format_row(&group.key, label_w, count_w, &group.stat));
    }
    lines.push(String::new());
    lines.push(format_row("Overall", label_w, count_w, &report.overall));
    lines.join("\n")
}
