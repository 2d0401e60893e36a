use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};

/// Error type for schedule lookups
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("unknown weekday: {0}")]
    UnknownWeekday(String),
}

/// Source of the user's weekly class schedule.
pub trait ScheduleProvider {
    /// Subjects expected on the given weekday (e.g. `"Monday"`), in display order.
    fn subjects_for_weekday(&self, weekday: &str) -> Result<Vec<String>, ScheduleError>;

    /// Every subject mentioned anywhere in the schedule.
    fn all_known_subjects(&self) -> BTreeSet<String>;
}

/// Weekdays in display order, Monday first
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Full English name of a weekday (`"Monday"`)
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Weekday name of a date, as passed to `subjects_for_weekday`
pub fn weekday_of(date: NaiveDate) -> &'static str {
    weekday_name(date.weekday())
}

/// Case-insensitive lookup of a full weekday name
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    let lower = name.trim().to_ascii_lowercase();
    WEEKDAYS
        .iter()
        .copied()
        .find(|d| weekday_name(*d).eq_ignore_ascii_case(&lower))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_names_round_trip() {
        for day in WEEKDAYS {
            assert_eq!(parse_weekday(weekday_name(day)), Some(day));
        }
        assert_eq!(parse_weekday("monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday(" SUNDAY "), Some(Weekday::Sun));
        assert_eq!(parse_weekday("Mon"), None);
        assert_eq!(parse_weekday("someday"), None);
    }

    #[test]
    fn weekday_of_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        assert_eq!(weekday_of(date), "Monday");
    }
}
