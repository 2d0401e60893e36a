use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;

/// Render the date bar: ` ← Mon 08 Jan 2024 →`. The right arrow is dimmed
/// when the current date is today.
pub fn render_date_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let date = app.state.current_date();

    let arrow = Style::default().fg(app.theme.text).bg(bg);
    let right_arrow = if app.state.at_latest_date() {
        Style::default()
            .fg(app.theme.dim)
            .bg(bg)
            .add_modifier(Modifier::DIM)
    } else {
        arrow
    };

    let mut spans = vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled("←", arrow),
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(
            date.format("%a").to_string(),
            Style::default()
                .fg(app.theme.highlight)
                .bg(app.theme.selection_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(
            date.format("%d %b %Y").to_string(),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ),
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled("→", right_arrow),
    ];

    if app.state.is_dirty() || !app.state.cached_dates().is_empty() {
        spans.push(Span::styled(
            "  unsaved",
            Style::default().fg(app.theme.dim).bg(bg),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
