use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::attendance::{DATE_FORMAT_HINT, parse_date};
use super::schedule::{ScheduleError, ScheduleProvider, parse_weekday};

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttendConfig {
    /// First day of the term (`DD-MM-YYYY`); default start for stats
    #[serde(default)]
    pub start_date: Option<String>,
    /// Show subjects that are not scheduled for a day as cancelled
    #[serde(default)]
    pub unscheduled_as_cancelled: bool,
    /// Weekday name (case-insensitive) → subjects in display order
    #[serde(default)]
    pub schedule: BTreeMap<String, Vec<String>>,
    /// TUI color overrides, `name = "#RRGGBB"`
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
}

impl AttendConfig {
    /// Check everything serde can't: weekday keys, subject names, start date.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(raw) = &self.start_date
            && !raw.trim().is_empty()
            && parse_date(raw).is_none()
        {
            return Err(format!(
                "invalid start_date '{}', expected {}",
                raw, DATE_FORMAT_HINT
            ));
        }

        let mut seen_days = HashSet::new();
        for (day, subjects) in &self.schedule {
            let weekday = parse_weekday(day).ok_or_else(|| {
                format!(
                    "invalid key in [schedule]: '{}', expected a day of the week (e.g. monday)",
                    day
                )
            })?;
            if !seen_days.insert(weekday) {
                return Err(format!("weekday '{}' is listed more than once", day));
            }
            let mut seen = HashSet::new();
            for subject in subjects {
                let name = subject.trim();
                if name.is_empty() {
                    return Err(format!("empty subject name on {}", day));
                }
                if name.eq_ignore_ascii_case("date") {
                    return Err(format!("'{}' is reserved and can't be a subject", name));
                }
                if !seen.insert(name) {
                    return Err(format!("subject '{}' is listed twice on {}", name, day));
                }
            }
        }
        Ok(())
    }

    /// Parsed start date, if one is configured
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date.as_deref().and_then(parse_date)
    }
}

impl ScheduleProvider for AttendConfig {
    fn subjects_for_weekday(&self, weekday: &str) -> Result<Vec<String>, ScheduleError> {
        let day = parse_weekday(weekday)
            .ok_or_else(|| ScheduleError::UnknownWeekday(weekday.to_string()))?;
        Ok(self
            .schedule
            .iter()
            .find(|(key, _)| parse_weekday(key) == Some(day))
            .map(|(_, subjects)| subjects.iter().map(|s| s.trim().to_string()).collect())
            .unwrap_or_default())
    }

    fn all_known_subjects(&self) -> BTreeSet<String> {
        self.schedule
            .values()
            .flatten()
            .map(|s| s.trim().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> AttendConfig {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn full_config_parses() {
        let config = parse(
            r#"
start_date = "01-08-2023"
unscheduled_as_cancelled = true

[schedule]
monday = ["Math", "Physics"]
Tuesday = ["Chemistry"]
thursday = []
"#,
        );
        assert!(config.validate().is_ok());
        assert!(config.unscheduled_as_cancelled);
        assert_eq!(
            config.start_date(),
            NaiveDate::from_ymd_opt(2023, 8, 1)
        );
        assert_eq!(
            config.subjects_for_weekday("Monday").unwrap(),
            vec!["Math", "Physics"]
        );
        assert_eq!(
            config.subjects_for_weekday("tuesday").unwrap(),
            vec!["Chemistry"]
        );
        assert!(config.subjects_for_weekday("Thursday").unwrap().is_empty());
        // Unlisted day is an empty schedule, not an error
        assert!(config.subjects_for_weekday("Sunday").unwrap().is_empty());
    }

    #[test]
    fn unknown_weekday_is_an_error() {
        let config = AttendConfig::default();
        assert!(matches!(
            config.subjects_for_weekday("Caturday"),
            Err(ScheduleError::UnknownWeekday(_))
        ));
    }

    #[test]
    fn all_known_subjects_is_deduplicated_and_sorted() {
        let config = parse(
            r#"
[schedule]
monday = ["Physics", "Math"]
friday = ["Math", "Biology"]
"#,
        );
        let all: Vec<String> = config.all_known_subjects().into_iter().collect();
        assert_eq!(all, vec!["Biology", "Math", "Physics"]);
    }

    #[test]
    fn defaults_on_empty_document() {
        let config = parse("");
        assert!(config.validate().is_ok());
        assert!(!config.unscheduled_as_cancelled);
        assert!(config.start_date().is_none());
        assert!(config.all_known_subjects().is_empty());
    }

    #[test]
    fn unknown_top_level_key_rejected() {
        assert!(toml::from_str::<AttendConfig>("colour = \"blue\"").is_err());
    }

    #[test]
    fn validate_rejects_bad_input() {
        let bad_day = parse("[schedule]\nfunday = [\"Math\"]\n");
        assert!(bad_day.validate().unwrap_err().contains("funday"));

        let empty_subject = parse("[schedule]\nmonday = [\"Math\", \" \"]\n");
        assert!(empty_subject.validate().is_err());

        let repeated = parse("[schedule]\nmonday = [\"Math\", \"Math\"]\n");
        assert!(repeated.validate().is_err());

        let reserved = parse("[schedule]\nmonday = [\"Date\"]\n");
        assert!(reserved.validate().is_err());

        let dup_day = parse("[schedule]\nmonday = [\"Math\"]\nMonday = [\"Art\"]\n");
        assert!(dup_day.validate().is_err());

        let bad_date = parse("start_date = \"2023-08-01\"\n");
        assert!(bad_date.validate().is_err());
    }
}
