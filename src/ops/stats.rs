use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::schedule::{WEEKDAYS, weekday_name};

/// Attended and held classes for one key. Cancelled classes count for neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stat {
    pub attended: u32,
    pub total: u32,
}

impl Stat {
    fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => {
                self.attended += 1;
                self.total += 1;
            }
            AttendanceStatus::Absent => self.total += 1,
            AttendanceStatus::Cancelled => {}
        }
    }

    /// Attended share in percent; 0 when nothing was held
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.attended) / f64::from(self.total) * 100.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Subject,
    Weekday,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyedStat {
    pub key: String,
    #[serde(flatten)]
    pub stat: Stat,
}

/// Grouped statistics plus the overall figure, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    pub group_by: GroupBy,
    pub groups: Vec<KeyedStat>,
    pub overall: Stat,
}

impl StatsReport {
    /// No held classes in range
    pub fn is_empty(&self) -> bool {
        self.overall.total == 0
    }
}

/// Per subject, ordered by subject name. Subjects whose classes were all
/// cancelled are omitted.
pub fn subject_stats(records: &[AttendanceRecord]) -> StatsReport {
    let mut overall = Stat::default();
    let mut by_subject: BTreeMap<&str, Stat> = BTreeMap::new();
    for record in records {
        if record.status == AttendanceStatus::Cancelled {
            continue;
        }
        overall.add(record.status);
        by_subject
            .entry(record.subject.as_str())
            .or_default()
            .add(record.status);
    }

    StatsReport {
        group_by: GroupBy::Subject,
        groups: by_subject
            .into_iter()
            .map(|(key, stat)| KeyedStat {
                key: key.to_string(),
                stat,
            })
            .collect(),
        overall,
    }
}

/// Per weekday, Monday first. Weekdays with no held classes are omitted.
pub fn weekday_stats(records: &[AttendanceRecord]) -> StatsReport {
    let mut overall = Stat::default();
    let mut by_day = [Stat::default(); 7];
    for record in records {
        if record.status == AttendanceStatus::Cancelled {
            continue;
        }
        overall.add(record.status);
        by_day[record.date.weekday().num_days_from_monday() as usize].add(record.status);
    }

    StatsReport {
        group_by: GroupBy::Weekday,
        groups: WEEKDAYS
            .iter()
            .zip(by_day)
            .filter(|(_, stat)| stat.total > 0)
            .map(|(day, stat)| KeyedStat {
                key: weekday_name(*day).to_string(),
                stat,
            })
            .collect(),
        overall,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use AttendanceStatus::{Absent, Cancelled, Present};

    fn record(d: u32, subject: &str, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            // January 2024: the 8th is a Monday
            date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
            subject: subject.to_string(),
            status,
        }
    }

    fn keyed(key: &str, attended: u32, total: u32) -> KeyedStat {
        KeyedStat {
            key: key.to_string(),
            stat: Stat { attended, total },
        }
    }

    fn sample() -> Vec<AttendanceRecord> {
        vec![
            record(8, "Math", Present),
            record(8, "English", Absent),
            record(9, "Physics", Cancelled),
            record(10, "Math", Present),
            record(15, "Math", Absent),
            record(15, "English", Present),
        ]
    }

    #[test]
    fn subject_stats_skip_cancelled() {
        let report = subject_stats(&sample());
        assert_eq!(
            report.groups,
            vec![keyed("English", 1, 2), keyed("Math", 2, 3)]
        );
        assert_eq!(report.overall, Stat { attended: 3, total: 5 });
    }

    #[test]
    fn weekday_stats_in_week_order() {
        let report = weekday_stats(&sample());
        assert_eq!(
            report.groups,
            vec![keyed("Monday", 2, 4), keyed("Wednesday", 1, 1)]
        );
        assert_eq!(report.overall, Stat { attended: 3, total: 5 });
    }

    #[test]
    fn empty_and_all_cancelled_are_empty() {
        assert!(subject_stats(&[]).is_empty());
        let report = subject_stats(&[record(9, "Physics", Cancelled)]);
        assert!(report.is_empty());
        assert!(report.groups.is_empty());
    }

    #[test]
    fn percentage_handles_zero_total() {
        assert_eq!(Stat::default().percentage(), 0.0);
        assert_eq!(Stat { attended: 1, total: 4 }.percentage(), 25.0);
    }

    #[test]
    fn report_serializes_flat() {
        let report = subject_stats(&[record(8, "Math", Present)]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "group_by": "subject",
                "groups": [{ "key": "Math", "attended": 1, "total": 1 }],
                "overall": { "attended": 1, "total": 1 }
            })
        );
    }
}
