use std::fs;

use chrono::NaiveDate;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::io::config_io::parse_config;
use crate::io::record_store::RecordStore;
use crate::model::config::AttendConfig;
use crate::ops::day_state::DayState;
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Monday and Tuesday classes
pub const WEEKLY_TOML: &str = "\
[schedule]
monday = [\"Math\", \"English\"]
tuesday = [\"Physics\"]
";

/// Render into an in-memory buffer and return it with styles.
pub fn render_to_buffer<F>(w: u16, h: u16, f: F) -> Buffer
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();
    terminal.backend().buffer().clone()
}

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let buf = render_to_buffer(w, h, f);
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Config plus a record file in a temp dir, for building an `App`.
pub struct Fixture {
    _dir: TempDir,
    pub store: RecordStore,
    pub config: AttendConfig,
}

impl Fixture {
    /// `csv` is written as the record file when given.
    pub fn new(config_toml: &str, csv: Option<&str>) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("attendance.csv");
        if let Some(csv) = csv {
            fs::write(&path, csv).unwrap();
        }
        let config = parse_config(config_toml).unwrap();
        let store = RecordStore::open(path, &config);
        Fixture {
            _dir: dir,
            store,
            config,
        }
    }

    pub fn app(&mut self, date: NaiveDate, today: NaiveDate) -> App<'_> {
        let state = DayState::initialize(
            date,
            today,
            self.config.unscheduled_as_cancelled,
            &mut self.store,
            &self.config,
        )
        .unwrap();
        App::new(state, &mut self.store, &self.config)
    }

    pub fn read_records(&self) -> String {
        fs::read_to_string(self.store.path()).unwrap_or_default()
    }
}

/// 08-01-2024, a Monday
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
}

pub fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()
}

pub fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()
}
