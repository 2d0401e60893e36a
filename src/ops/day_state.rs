use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

use crate::io::record_store::{AttendanceRepository, StoreError};
use crate::model::attendance::{AttendanceEntry, AttendanceStatus};
use crate::model::schedule::{ScheduleError, ScheduleProvider, weekday_of};

/// Error type for loading a date's entries
#[derive(Debug, thiserror::Error)]
pub enum DayStateError {
    #[error("could not load saved attendance: {0}")]
    Store(#[from] StoreError),
    #[error("could not load schedule: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("{date} is in the future (today is {today})")]
    FutureDate { date: NaiveDate, today: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStep {
    Prev,
    Next,
}

/// Session state: the date being viewed, its entries, and every date
/// touched so far. Nothing is written until commit.
#[derive(Debug, Clone)]
pub struct DayState {
    current_date: NaiveDate,
    today: NaiveDate,
    at_latest_date: bool,
    entries: Vec<AttendanceEntry>,
    cursor: usize,
    date_cache: BTreeMap<NaiveDate, Vec<AttendanceEntry>>,
    /// Entries differ from what's cached or saved and must be cached before
    /// leaving the date
    dirty: bool,
    unscheduled_as_cancelled: bool,
}

impl DayState {
    /// Start a session on `date`. Dates after `today` are rejected.
    pub fn initialize(
        date: NaiveDate,
        today: NaiveDate,
        unscheduled_as_cancelled: bool,
        repo: &mut dyn AttendanceRepository,
        schedule: &dyn ScheduleProvider,
    ) -> Result<Self, DayStateError> {
        if date > today {
            return Err(DayStateError::FutureDate { date, today });
        }
        let mut state = DayState {
            current_date: date,
            today,
            at_latest_date: date == today,
            entries: Vec::new(),
            cursor: 0,
            date_cache: BTreeMap::new(),
            dirty: false,
            unscheduled_as_cancelled,
        };
        state.load_entries_for_current_date(repo, schedule)?;
        Ok(state)
    }

    // -- accessors ----------------------------------------------------------

    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    pub fn at_latest_date(&self) -> bool {
        self.at_latest_date
    }

    pub fn entries(&self) -> &[AttendanceEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Every date cached this session, with its entries
    pub fn cached_dates(&self) -> &BTreeMap<NaiveDate, Vec<AttendanceEntry>> {
        &self.date_cache
    }

    // -- loading ------------------------------------------------------------

    /// Load entries for `current_date`: session cache first, then the record
    /// file, then the weekday schedule.
    pub fn load_entries_for_current_date(
        &mut self,
        repo: &mut dyn AttendanceRepository,
        schedule: &dyn ScheduleProvider,
    ) -> Result<(), DayStateError> {
        if let Some(cached) = self.date_cache.get(&self.current_date) {
            self.entries = cached.clone();
            self.dirty = false;
        } else if let Some(saved) = repo.entries_for_date(self.current_date)? {
            self.entries = saved;
            if self.unscheduled_as_cancelled {
                self.backfill_cancelled(schedule);
            }
            self.dirty = false;
        } else {
            let scheduled = schedule.subjects_for_weekday(weekday_of(self.current_date))?;
            self.entries = scheduled
                .into_iter()
                .map(|s| AttendanceEntry::new(s, AttendanceStatus::Absent))
                .collect();
            if self.unscheduled_as_cancelled {
                self.backfill_cancelled(schedule);
            }
            self.dirty = true;
        }

        if self.cursor >= self.entries.len() {
            self.cursor = self.entries.len().saturating_sub(1);
        }
        tracing::debug!(
            date = %self.current_date,
            entries = self.entries.len(),
            dirty = self.dirty,
            "loaded date"
        );
        Ok(())
    }

    /// Append every known subject missing from `entries` as cancelled.
    fn backfill_cancelled(&mut self, schedule: &dyn ScheduleProvider) {
        for subject in schedule.all_known_subjects() {
            if !self.entries.iter().any(|e| e.subject == subject) {
                self.entries
                    .push(AttendanceEntry::new(subject, AttendanceStatus::Cancelled));
            }
        }
    }

    // -- editing ------------------------------------------------------------

    /// Move the cursor, stopping at either end of the list
    pub fn move_cursor(&mut self, direction: CursorMove) {
        match direction {
            CursorMove::Up => self.cursor = self.cursor.saturating_sub(1),
            CursorMove::Down => {
                if self.cursor + 1 < self.entries.len() {
                    self.cursor += 1;
                }
            }
        }
    }

    /// Absent → present, present → absent, cancelled → present
    pub fn toggle_status(&mut self) {
        let Some(entry) = self.entries.get_mut(self.cursor) else {
            return;
        };
        entry.status = match entry.status {
            AttendanceStatus::Absent | AttendanceStatus::Cancelled => AttendanceStatus::Present,
            AttendanceStatus::Present => AttendanceStatus::Absent,
        };
        self.dirty = true;
    }

    /// Cancelled → absent, anything else → cancelled
    pub fn toggle_cancelled(&mut self) {
        let Some(entry) = self.entries.get_mut(self.cursor) else {
            return;
        };
        entry.status = match entry.status {
            AttendanceStatus::Cancelled => AttendanceStatus::Absent,
            _ => AttendanceStatus::Cancelled,
        };
        self.dirty = true;
    }

    // -- navigation ---------------------------------------------------------

    /// Move one day back or forward, caching edits first. Never moves past
    /// today.
    pub fn step_day(
        &mut self,
        step: DayStep,
        repo: &mut dyn AttendanceRepository,
        schedule: &dyn ScheduleProvider,
    ) -> Result<(), DayStateError> {
        let target = match step {
            DayStep::Next if self.at_latest_date => return Ok(()),
            DayStep::Next => self.current_date.checked_add_days(Days::new(1)),
            DayStep::Prev => self.current_date.checked_sub_days(Days::new(1)),
        };
        let Some(target) = target else {
            return Ok(());
        };

        if self.dirty {
            self.cache_current();
        }
        self.current_date = target;
        self.at_latest_date = target == self.today;
        self.load_entries_for_current_date(repo, schedule)
    }

    /// Cache the visible entries for the current date, dirty or not.
    pub fn cache_current(&mut self) {
        self.date_cache
            .insert(self.current_date, self.entries.clone());
        self.dirty = false;
    }
}
