use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::record_store::RecordStore;
use crate::model::config::AttendConfig;
use crate::ops::commit::commit;
use crate::ops::day_state::{DayState, DayStateError, DayStep};

use super::input;
use super::render;
use super::theme::Theme;

/// How the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Saved,
    Cancelled,
}

/// Main application state
pub struct App<'a> {
    pub state: DayState,
    pub store: &'a mut RecordStore,
    pub config: &'a AttendConfig,
    pub theme: Theme,
    pub should_quit: bool,
    pub outcome: Outcome,
    /// One-line message shown in the hint row until the next key
    pub message: Option<String>,
    /// Error that ended the session
    pub failure: Option<DayStateError>,
}

impl<'a> App<'a> {
    pub fn new(state: DayState, store: &'a mut RecordStore, config: &'a AttendConfig) -> Self {
        App {
            state,
            store,
            config,
            theme: Theme::from_config(&config.colors),
            should_quit: false,
            outcome: Outcome::Cancelled,
            message: None,
            failure: None,
        }
    }

    /// Step to the previous or next day. A load failure ends the session
    /// without saving.
    pub fn step_day(&mut self, step: DayStep) {
        if let Err(e) = self.state.step_day(step, &mut *self.store, self.config) {
            tracing::error!(error = %e, "could not load date");
            self.failure = Some(e);
            self.quit(Outcome::Cancelled);
        }
    }

    /// Write the session to disk and quit. On failure stay open so the
    /// user can retry.
    pub fn confirm(&mut self) {
        match commit(&mut self.state, &mut *self.store) {
            Ok(()) => self.quit(Outcome::Saved),
            Err(e) => {
                tracing::error!(error = %e, "commit failed");
                self.message = Some(format!("Save failed: {}", e));
            }
        }
    }

    pub fn quit(&mut self, outcome: Outcome) {
        self.outcome = outcome;
        self.should_quit = true;
    }
}

/// Run the attendance screen until the user confirms or quits.
pub fn run(
    state: DayState,
    store: &mut RecordStore,
    config: &AttendConfig,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    let mut app = App::new(state, store, config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Run event loop
    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    if let Some(e) = app.failure.take() {
        return Err(e.into());
    }
    tracing::info!(outcome = ?app.outcome, "session ended");
    Ok(app.outcome)
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
