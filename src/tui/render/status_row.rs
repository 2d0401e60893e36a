use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::app::App;

const HINTS: &[(&str, &str)] = &[
    ("Space", "Present/Absent"),
    ("c", "Cancelled"),
    ("←/→", "Day"),
    ("Enter", "Confirm"),
    ("q", "Quit"),
];

/// Render the hint row (bottom of screen), or the pending message
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = if let Some(ref message) = app.message {
        Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(app.theme.red).bg(bg),
        ))
    } else {
        let mut spans = vec![Span::styled(" ", Style::default().bg(bg))];
        let mut used = 1;
        for (key, label) in HINTS {
            let hint_width = key.width() + label.width() + 3;
            // Drop hints that don't fit rather than wrapping
            if used + hint_width > width {
                break;
            }
            spans.push(Span::styled(
                key.to_string(),
                Style::default()
                    .fg(app.theme.highlight)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!(" {}  ", label),
                Style::default().fg(app.theme.dim).bg(bg),
            ));
            used += hint_width;
        }
        Line::from(spans)
    };

    let paragraph = Paragraph::new(line).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shows_all_hints_when_wide() {
        let mut fx = Fixture::new(WEEKLY_TOML, None);
        let app = fx.app(monday(), monday());
        let output = render_to_string(TERM_W, 1, |frame, area| {
            render_status_row(frame, &app, area);
        });
        assert_eq!(
            output,
            " Space Present/Absent  c Cancelled  ←/→ Day  Enter Confirm  q Quit"
        );
    }

    #[test]
    fn narrow_row_drops_trailing_hints() {
        let mut fx = Fixture::new(WEEKLY_TOML, None);
        let app = fx.app(monday(), monday());
        let output = render_to_string(30, 1, |frame, area| {
            render_status_row(frame, &app, area);
        });
        assert_eq!(output, " Space Present/Absent");
    }

    #[test]
    fn message_replaces_hints() {
        let mut fx = Fixture::new(WEEKLY_TOML, None);
        let mut app = fx.app(monday(), monday());
        app.message = Some("Save failed: disk full".into());
        let output = render_to_string(TERM_W, 1, |frame, area| {
            render_status_row(frame, &app, area);
        });
        assert_eq!(output, " Save failed: disk full");
    }
}
