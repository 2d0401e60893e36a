use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::day_state::{CursorMove, DayStep};

use super::app::{App, Outcome};

/// Handle a key event
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.message = None;

    match (key.modifiers, key.code) {
        (m, KeyCode::Char('c')) if m.contains(KeyModifiers::CONTROL) => {
            app.quit(Outcome::Cancelled)
        }
        (_, KeyCode::Char('q')) | (_, KeyCode::Esc) => app.quit(Outcome::Cancelled),

        (_, KeyCode::Up) | (_, KeyCode::Char('k')) => app.state.move_cursor(CursorMove::Up),
        (_, KeyCode::Down) | (_, KeyCode::Char('j')) => app.state.move_cursor(CursorMove::Down),
        (_, KeyCode::Left) | (_, KeyCode::Char('h')) => app.step_day(DayStep::Prev),
        (_, KeyCode::Right) | (_, KeyCode::Char('l')) => app.step_day(DayStep::Next),

        (_, KeyCode::Char(' ')) => app.state.toggle_status(),
        (_, KeyCode::Char('c')) => app.state.toggle_cancelled(),
        (_, KeyCode::Enter) => app.confirm(),

        _ => {}
    }
}
