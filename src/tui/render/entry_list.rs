use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::attendance::AttendanceStatus;
use crate::model::schedule::weekday_of;
use crate::tui::app::App;

const CURSOR: &str = "❯";

fn bullet(status: AttendanceStatus) -> &'static str {
    match status {
        AttendanceStatus::Present => "●",
        AttendanceStatus::Absent => "○",
        AttendanceStatus::Cancelled => "✗",
    }
}

/// First visible row so the cursor stays on screen
fn scroll_offset(cursor: usize, height: usize) -> usize {
    if height == 0 {
        0
    } else {
        cursor.saturating_sub(height - 1)
    }
}

/// Render the entries for the current date, one per row
pub fn render_entry_list(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let entries = app.state.entries();

    if entries.is_empty() {
        let line = Line::from(Span::styled(
            format!("   No classes for {}", weekday_of(app.state.current_date())),
            Style::default()
                .fg(app.theme.yellow)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
        return;
    }

    let height = area.height as usize;
    let offset = scroll_offset(app.state.cursor(), height);

    let lines: Vec<Line> = entries
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, entry)| {
            let is_cursor = i == app.state.cursor();
            let mut style = Style::default().bg(bg);
            style = match entry.status {
                AttendanceStatus::Present => style.fg(app.theme.status_color(entry.status)),
                AttendanceStatus::Absent => style.fg(app.theme.text),
                AttendanceStatus::Cancelled => style
                    .fg(app.theme.dim)
                    .add_modifier(Modifier::CROSSED_OUT),
            };
            if is_cursor {
                style = style.add_modifier(Modifier::BOLD);
            }

            let marker = if is_cursor {
                Span::styled(
                    format!(" {} ", CURSOR),
                    Style::default().fg(app.theme.highlight).bg(bg),
                )
            } else {
                Span::styled("   ", Style::default().bg(bg))
            };
            Line::from(vec![
                marker,
                Span::styled(format!("{} {}", bullet(entry.status), entry.subject), style),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::day_state::CursorMove;
    use crate::tui::render::test_helpers::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bullets_follow_status() {
        let csv = "Date,English,Math,Physics\n08-01-2024,1,0,2\n";
        let mut fx = Fixture::new(WEEKLY_TOML, Some(csv));
        let app = fx.app(monday(), monday());
        let output = render_to_string(TERM_W, 5, |frame, area| {
            render_entry_list(frame, &app, area);
        });
        assert_eq!(output, " ❯ ● English\n   ○ Math\n   ✗ Physics");
    }

    #[test]
    fn cancelled_entries_are_struck_through() {
        let csv = "Date,English,Math,Physics\n08-01-2024,2,,\n";
        let mut fx = Fixture::new(WEEKLY_TOML, Some(csv));
        let app = fx.app(monday(), monday());
        let buf = render_to_buffer(TERM_W, 3, |frame, area| {
            render_entry_list(frame, &app, area);
        });
        assert!(buf[(5, 0)].modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn empty_day_shows_weekday() {
        let mut fx = Fixture::new(WEEKLY_TOML, None);
        let app = fx.app(sunday(), monday());
        let output = render_to_string(TERM_W, 5, |frame, area| {
            render_entry_list(frame, &app, area);
        });
        assert_eq!(output, "   No classes for Sunday");
    }

    #[test]
    fn list_scrolls_to_keep_cursor_visible() {
        let config = "[schedule]\nmonday = [\"A\", \"B\", \"C\", \"D\"]\n";
        let mut fx = Fixture::new(config, None);
        let mut app = fx.app(monday(), monday());
        for _ in 0..3 {
            app.state.move_cursor(CursorMove::Down);
        }
        let output = render_to_string(TERM_W, 2, |frame, area| {
            render_entry_list(frame, &app, area);
        });
        assert_eq!(output, "   ○ C\n ❯ ○ D");
    }

    #[test]
    fn scroll_offset_bounds() {
        assert_eq!(scroll_offset(0, 5), 0);
        assert_eq!(scroll_offset(4, 5), 0);
        assert_eq!(scroll_offset(7, 5), 3);
        assert_eq!(scroll_offset(3, 0), 0);
    }
}
