use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::io::recovery::{RecoveryCategory, atomic_write, log_failed_write};
use crate::model::attendance::{
    AttendanceEntry, AttendanceRecord, AttendanceStatus, format_date, parse_date,
};
use crate::model::schedule::ScheduleProvider;

/// Literal tag in column 0 of the header row
pub const DATE_COLUMN: &str = "Date";

/// Error type for record file operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("corrupted record file (line {line}): {message}")]
    Format { line: u64, message: String },
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    #[error("no '{subject}' column in the record file (saving {date})")]
    Conversion { subject: String, date: String },
    #[error("'{subject}' appears twice on {date}")]
    DuplicateEntry { subject: String, date: String },
    #[error("no subject named '{0}' in the record file")]
    UnknownSubject(String),
    #[error("a subject named '{0}' already exists")]
    DuplicateSubject(String),
    #[error("invalid rename: {0}")]
    InvalidRename(String),
}

/// Lookup of saved entries by date.
pub trait AttendanceRepository {
    /// Saved entries for `date`, or `None` if that date was never saved.
    fn entries_for_date(
        &mut self,
        date: NaiveDate,
    ) -> Result<Option<Vec<AttendanceEntry>>, StoreError>;
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// In-memory copy of the record file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    /// `Date` followed by subject columns in append order
    pub header: Vec<String>,
    /// One row per saved date; cells aligned to `header`, possibly shorter
    pub rows: Vec<Vec<String>>,
    /// Source line of each entry in `rows`, for error reports
    row_lines: Vec<u64>,
    /// File text as last read or written
    source: Option<RawSource>,
}

/// File text plus the byte range of its header line, terminator included.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawSource {
    text: String,
    header_start: usize,
    header_end: usize,
}

impl RawSource {
    /// Locate the header line starting at `header_start`. `None` unless that
    /// single line parses back to exactly `header`.
    fn locate(text: String, header_start: usize, header: &[String]) -> Option<RawSource> {
        let rest = text.get(header_start..)?;
        let header_end = rest.find('\n').map_or(text.len(), |i| header_start + i + 1);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text[header_start..header_end].as_bytes());
        let mut record = csv::StringRecord::new();
        if !reader.read_record(&mut record).ok()?
            || record.iter().ne(header.iter().map(String::as_str))
        {
            return None;
        }
        if reader.read_record(&mut record).ok()? {
            return None;
        }

        Some(RawSource {
            text,
            header_start,
            header_end,
        })
    }
}

/// Maps csv reader positions to where records really start.
///
/// The reader reports a record's position before skipping blank lines and
/// the `\n` of a preceding `\r\n`, so both are stepped over here.
struct LineCounter<'a> {
    bytes: &'a [u8],
    scanned: usize,
    line: u64,
}

impl<'a> LineCounter<'a> {
    fn new(text: &'a str) -> Self {
        LineCounter {
            bytes: text.as_bytes(),
            scanned: 0,
            line: 1,
        }
    }

    /// Byte offset and 1-based line of the record the reader placed at `pos`.
    /// Positions must be passed in increasing order.
    fn record_start(&mut self, pos: usize) -> (usize, u64) {
        let mut start = pos.min(self.bytes.len());
        while matches!(self.bytes.get(start), Some(b'\r' | b'\n')) {
            start += 1;
        }
        if start > self.scanned {
            let newlines = self.bytes[self.scanned..start]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.line += newlines as u64;
            self.scanned = start;
        }
        (start, self.line)
    }
}

impl Table {
    fn with_subjects<'a>(subjects: impl IntoIterator<Item = &'a String>) -> Self {
        let mut header = vec![DATE_COLUMN.to_string()];
        header.extend(subjects.into_iter().cloned());
        Table {
            header,
            ..Table::default()
        }
    }

    /// Subject columns (header without the `Date` tag)
    pub fn subjects(&self) -> &[String] {
        self.header.get(1..).unwrap_or(&[])
    }

    fn find_row(&self, date: NaiveDate) -> Option<(u64, &Vec<String>)> {
        self.rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.first().and_then(|cell| parse_date(cell)) == Some(date))
            .map(|(i, row)| (self.row_line(i), row))
    }

    fn row_line(&self, index: usize) -> u64 {
        self.row_lines.get(index).copied().unwrap_or(0)
    }

    /// Parse and validate CSV text. Blank input yields an empty table.
    fn parse(text: &str) -> Result<Table, StoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut table = Table::default();
        let mut header_start = None;
        let mut seen_dates = HashSet::new();
        let mut lines = LineCounter::new(text);
        let mut record = csv::StringRecord::new();
        while reader.read_record(&mut record)? {
            let start = record.position().map_or(0, |p| p.byte() as usize);
            let (start, line) = lines.record_start(start);
            let cells: Vec<String> = record.iter().map(str::to_string).collect();
            if cells.iter().all(|c| c.is_empty()) {
                continue;
            }

            if table.header.is_empty() {
                validate_header(&cells).map_err(StoreError::InvalidHeader)?;
                header_start = Some(start);
                table.header = cells;
                continue;
            }

            let date = validate_row(&table.header, &cells)
                .map_err(|message| StoreError::Format { line, message })?;
            if !seen_dates.insert(date) {
                return Err(StoreError::Format {
                    line,
                    message: format!("duplicate row for {}", cells[0]),
                });
            }
            table.rows.push(cells);
            table.row_lines.push(line);
        }

        table.source = header_start
            .and_then(|start| RawSource::locate(text.to_string(), start, &table.header));
        Ok(table)
    }

    fn csv_writer() -> csv::Writer<Vec<u8>> {
        csv::WriterBuilder::new()
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new())
    }

    fn into_string(writer: csv::Writer<Vec<u8>>) -> Result<String, StoreError> {
        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| StoreError::InvalidHeader(e.to_string()))
    }

    /// Serialize to CSV text, one record per line.
    fn to_csv(&self) -> Result<String, StoreError> {
        let mut writer = Self::csv_writer();
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        Self::into_string(writer)
    }

    /// File text with only the header line replaced by the current header.
    /// Everything else, line endings included, is kept byte for byte. Falls
    /// back to a full rewrite when the header line couldn't be located.
    fn with_header_rewritten(&self) -> Result<String, StoreError> {
        let Some(source) = &self.source else {
            return self.to_csv();
        };

        let mut writer = Self::csv_writer();
        writer.write_record(&self.header)?;
        let mut line = Self::into_string(writer)?;
        if source.text[..source.header_end].ends_with("\r\n") {
            line.pop();
            line.push_str("\r\n");
        }

        Ok(format!(
            "{}{}{}",
            &source.text[..source.header_start],
            line,
            &source.text[source.header_end..]
        ))
    }
}

// ---------------------------------------------------------------------------
// Validation and row <-> entry conversion
// ---------------------------------------------------------------------------

fn validate_header(header: &[String]) -> Result<(), String> {
    if header.len() < 2 {
        return Err("header must have a Date column and at least one subject".into());
    }
    if header[0] != DATE_COLUMN {
        return Err(format!("first column must be '{}'", DATE_COLUMN));
    }
    let mut seen = HashSet::new();
    for subject in &header[1..] {
        if subject.is_empty() {
            return Err("empty subject name".into());
        }
        if !seen.insert(subject.as_str()) {
            return Err(format!("duplicate subject '{}'", subject));
        }
    }
    Ok(())
}

/// Check a data row against the header and return its date.
fn validate_row(header: &[String], row: &[String]) -> Result<NaiveDate, String> {
    if row.len() > header.len() {
        return Err(format!(
            "row has {} cells but the header only has {}",
            row.len(),
            header.len()
        ));
    }
    let date = parse_date(&row[0]).ok_or_else(|| format!("invalid date '{}'", row[0]))?;
    for cell in &row[1..] {
        decode_status(cell)?;
    }
    Ok(date)
}

/// Decode one cell. Empty means the subject didn't exist for that date.
fn decode_status(cell: &str) -> Result<Option<AttendanceStatus>, String> {
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<u8>()
        .ok()
        .and_then(AttendanceStatus::from_code)
        .map(Some)
        .ok_or_else(|| format!("invalid status code '{}'", cell))
}

/// Map a row's cells onto header subjects, skipping empty and missing cells.
fn row_to_entries(header: &[String], row: &[String]) -> Result<Vec<AttendanceEntry>, String> {
    let mut entries = Vec::new();
    for (subject, cell) in header.iter().zip(row).skip(1) {
        if let Some(status) = decode_status(cell)? {
            entries.push(AttendanceEntry::new(subject.clone(), status));
        }
    }
    Ok(entries)
}

/// Build a full-width row for `date`. Subjects without an entry get an
/// empty cell.
fn entries_to_row(
    header: &[String],
    date: NaiveDate,
    entries: &[AttendanceEntry],
) -> Result<Vec<String>, StoreError> {
    let date_str = format_date(date);
    let mut row = vec![String::new(); header.len()];
    for entry in entries {
        let idx = header
            .iter()
            .skip(1)
            .position(|s| *s == entry.subject)
            .map(|i| i + 1)
            .ok_or_else(|| StoreError::Conversion {
                subject: entry.subject.clone(),
                date: date_str.clone(),
            })?;
        if !row[idx].is_empty() {
            return Err(StoreError::DuplicateEntry {
                subject: entry.subject.clone(),
                date: date_str,
            });
        }
        row[idx] = entry.status.code().to_string();
    }
    row[0] = date_str;
    Ok(row)
}

/// Append known subjects missing from the header, lexicographically.
/// Returns the subjects that were added.
fn append_missing_subjects(header: &mut Vec<String>, known: &BTreeSet<String>) -> Vec<String> {
    let added: Vec<String> = known
        .iter()
        .filter(|s| !header.iter().skip(1).any(|h| h == *s))
        .cloned()
        .collect();
    header.extend(added.iter().cloned());
    added
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// The attendance record file: a CSV table with a growing header.
pub struct RecordStore {
    path: PathBuf,
    known_subjects: BTreeSet<String>,
    cache: Option<Table>,
}

impl RecordStore {
    /// Create a store for `path`. Snapshots the schedule's subject set; the
    /// file isn't touched until the first load.
    pub fn open(path: impl Into<PathBuf>, schedule: &dyn ScheduleProvider) -> Self {
        RecordStore {
            path: path.into(),
            known_subjects: schedule.all_known_subjects(),
            cache: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop the cached table so the next access re-reads the file.
    #[cfg(test)]
    fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Read the whole table, creating the file with a fresh header if it is
    /// missing or empty and appending newly known subjects to the header.
    /// Cached until the next write.
    pub fn load_all(&mut self) -> Result<&Table, StoreError> {
        let table = match self.cache.take() {
            Some(table) => table,
            None => self.read_table()?,
        };
        Ok(self.cache.insert(table))
    }

    /// Append every known subject that the header lacks, rewriting the file
    /// if anything changed. Never removes or reorders columns.
    pub fn reconcile_header(&mut self) -> Result<bool, StoreError> {
        let mut table = self.load_all()?.clone();
        let changed = self.reconcile_table(&mut table)?;
        self.cache = Some(table);
        Ok(changed)
    }

    /// Every non-empty cell of every row dated within the given bounds.
    pub fn records_in_range(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let table = self.load_all()?;
        let mut records = Vec::new();
        for (i, row) in table.rows.iter().enumerate() {
            let Some(date) = parse_date(&row[0]) else {
                continue;
            };
            if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
                continue;
            }
            let entries =
                row_to_entries(&table.header, row).map_err(|message| StoreError::Format {
                    line: table.row_line(i),
                    message,
                })?;
            records.extend(entries.into_iter().map(|e| AttendanceRecord {
                date,
                subject: e.subject,
                status: e.status,
            }));
        }
        records.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(records)
    }

    /// Merge the given dates into the table and atomically rewrite the file.
    ///
    /// The header must already contain every subject in `entries_by_date`.
    /// On error the file and the cache are left as they were.
    pub fn persist(
        &mut self,
        entries_by_date: BTreeMap<NaiveDate, Vec<AttendanceEntry>>,
    ) -> Result<(), StoreError> {
        let mut table = self.load_all()?.clone();

        let mut by_date: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
        for row in table.rows.drain(..) {
            if let Some(date) = parse_date(&row[0]) {
                by_date.insert(date, row);
            }
        }
        let count = entries_by_date.len();
        for (date, entries) in entries_by_date {
            let row = entries_to_row(&table.header, date, &entries)?;
            by_date.insert(date, row);
        }
        table.rows = by_date.into_values().collect();

        let content = table.to_csv()?;
        self.write_content(&content, RecoveryCategory::Write)?;
        tracing::info!(dates = count, rows = table.rows.len(), "persisted attendance");
        self.cache = Some(Table::parse(&content)?);
        Ok(())
    }

    /// Rename a subject column. Cells are untouched.
    pub fn rename_subject(&mut self, old: &str, new: &str) -> Result<(), StoreError> {
        let new = new.trim();
        if old.is_empty() || new.is_empty() {
            return Err(StoreError::InvalidRename(
                "subject names cannot be empty".into(),
            ));
        }
        if old == new {
            return Err(StoreError::InvalidRename(
                "old and new names are the same".into(),
            ));
        }
        if new == DATE_COLUMN {
            return Err(StoreError::InvalidRename(format!(
                "'{}' is reserved",
                DATE_COLUMN
            )));
        }

        let mut table = self.load_all()?.clone();
        if table.subjects().iter().any(|s| s == new) {
            return Err(StoreError::DuplicateSubject(new.to_string()));
        }
        let idx = table
            .subjects()
            .iter()
            .position(|s| s == old)
            .ok_or_else(|| StoreError::UnknownSubject(old.to_string()))?;
        table.header[idx + 1] = new.to_string();

        let content = table.with_header_rewritten()?;
        self.write_content(&content, RecoveryCategory::Rename)?;
        tracing::info!(old, new, "renamed subject");
        self.cache = Some(Table::parse(&content)?);
        Ok(())
    }

    // -- internals ----------------------------------------------------------

    fn read_table(&self) -> Result<Table, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let mut table = Table::parse(&text)?;
        if table.header.is_empty() {
            table = Table::with_subjects(&self.known_subjects);
            validate_header(&table.header).map_err(|_| {
                StoreError::InvalidHeader(
                    "no subjects configured; add a [schedule] to the config file".into(),
                )
            })?;
            let content = table.to_csv()?;
            self.write_content(&content, RecoveryCategory::Write)?;
            tracing::info!(
                path = %self.path.display(),
                subjects = table.subjects().len(),
                "created record file"
            );
            return Table::parse(&content);
        }

        self.reconcile_table(&mut table)?;
        tracing::debug!(
            path = %self.path.display(),
            rows = table.rows.len(),
            "loaded record file"
        );
        Ok(table)
    }

    fn reconcile_table(&self, table: &mut Table) -> Result<bool, StoreError> {
        let added = append_missing_subjects(&mut table.header, &self.known_subjects);
        if added.is_empty() {
            return Ok(false);
        }
        // Only the header line changes; row bytes stay as they were.
        let content = table.with_header_rewritten()?;
        self.write_content(&content, RecoveryCategory::Write)?;
        tracing::info!(subjects = ?added, "appended subjects to header");
        *table = Table::parse(&content)?;
        Ok(true)
    }

    fn write_content(&self, content: &str, category: RecoveryCategory) -> Result<(), StoreError> {
        if let Err(e) = atomic_write(&self.path, content.as_bytes()) {
            log_failed_write(&self.path, category, &e, content.to_string());
            return Err(StoreError::Io {
                path: self.path.clone(),
                source: e,
            });
        }
        Ok(())
    }
}

impl AttendanceRepository for RecordStore {
    fn entries_for_date(
        &mut self,
        date: NaiveDate,
    ) -> Result<Option<Vec<AttendanceEntry>>, StoreError> {
        let table = self.load_all()?;
        match table.find_row(date) {
            Some((line, row)) => row_to_entries(&table.header, row)
                .map(Some)
                .map_err(|message| StoreError::Format { line, message }),
            None => Ok(None),
        }
    }
}
