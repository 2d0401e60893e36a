pub mod date_bar;
pub mod entry_list;
pub mod status_row;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::App;

/// Main render function: date bar, entry list, hint row
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // top padding
            Constraint::Length(1), // date bar
            Constraint::Length(1), // separator
            Constraint::Min(1),    // entries
            Constraint::Length(1), // hints / messages
        ])
        .split(area);

    date_bar::render_date_bar(frame, app, chunks[1]);
    entry_list::render_entry_list(frame, app, chunks[3]);
    status_row::render_status_row(frame, app, chunks[4]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_screen_layout() {
        let mut fx = Fixture::new(WEEKLY_TOML, None);
        let app = fx.app(monday(), monday());
        let output = render_to_string(TERM_W, TERM_H, |frame, _area| {
            render(frame, &app);
        });
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], " ← Mon 08 Jan 2024 →  unsaved");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], " ❯ ○ Math");
        assert_eq!(lines[4], "   ○ English");
        assert!(lines.last().unwrap().contains("Enter Confirm"));
    }
}
