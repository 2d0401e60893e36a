use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// On-disk and CLI date format (`10-01-2024`)
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Human-readable date format for `DATE_FORMAT`
pub const DATE_FORMAT_HINT: &str = "DD-MM-YYYY";

/// Attendance state of one subject on one date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Cancelled,
}

impl AttendanceStatus {
    /// The integer code written to the record file.
    ///
    /// Existing files depend on this mapping: 0 absent, 1 present, 2 cancelled.
    pub fn code(self) -> u8 {
        match self {
            AttendanceStatus::Absent => 0,
            AttendanceStatus::Present => 1,
            AttendanceStatus::Cancelled => 2,
        }
    }

    /// Parse a record file code into a status
    pub fn from_code(code: u8) -> Option<AttendanceStatus> {
        match code {
            0 => Some(AttendanceStatus::Absent),
            1 => Some(AttendanceStatus::Present),
            2 => Some(AttendanceStatus::Cancelled),
            _ => None,
        }
    }
}

/// One subject's status for the date being edited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub subject: String,
    pub status: AttendanceStatus,
}

impl AttendanceEntry {
    pub fn new(subject: impl Into<String>, status: AttendanceStatus) -> Self {
        AttendanceEntry {
            subject: subject.into(),
            status,
        }
    }
}

/// A single non-empty cell of the record file, with its row date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub subject: String,
    pub status: AttendanceStatus,
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}
