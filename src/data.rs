//! Dataset model: tagged cells, rows aligned to a column list, and immutable
//! dataset snapshots.
//!
//! Every "mutation" ([`Dataset::with_cell`], [`Dataset::with_column`]) returns
//! a new snapshot. Numeric coercion and date parsing happen on read and are
//! never written back into the cells.

use std::{borrow::Cow, collections::HashMap, fmt};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ExploreError;

static NULL_CELL: Cell = Cell::Null;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    #[default]
    Null,
}

impl Cell {
    /// Numeric view of the cell. Only finite values are returned; Null, blank
    /// text and anything that is not a numeric literal yield `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Number(_) | Cell::Null => None,
            Cell::Text(s) => coerce_number(s),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.as_number().is_none()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Number(n) => Cow::Owned(format_number(*n)),
            Cell::Null => Cow::Borrowed(""),
        }
    }

    pub fn folded_text(&self) -> String {
        self.to_text().to_lowercase()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

/// Shortest round-trip decimal form; `-0` renders as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Permissive numeric literal parsing for text cells.
///
/// Accepts surrounding whitespace, an optional sign, decimal and exponent
/// forms (`1e3`, `.5`, `5.`), and unsigned `0x`/`0o`/`0b` integer literals.
/// Blank text and non-finite results are rejected.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = parse_radix_literal(trimmed).or_else(|| parse_decimal_literal(trimmed))?;
    parsed.is_finite().then_some(parsed)
}

fn parse_decimal_literal(value: &str) -> Option<f64> {
    let allowed = value
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !allowed {
        return None;
    }
    value.parse::<f64>().ok()
}

fn parse_radix_literal(value: &str) -> Option<f64> {
    let lowered = value.get(..2)?.to_ascii_lowercase();
    let radix = match lowered.as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };
    u64::from_str_radix(&value[2..], radix)
        .ok()
        .map(|parsed| parsed as f64)
}

/// Parses a date or date-time and returns milliseconds since the Unix epoch.
/// Values without an offset are read as UTC.
pub fn parse_timestamp_millis(value: &str) -> Option<i64> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y"];
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
    ];

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.timestamp_millis());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return parsed
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    None
}

pub fn format_iso_day(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> &Cell {
        self.cells.get(index).unwrap_or(&NULL_CELL)
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}

/// An immutable snapshot of a parsed table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Builds a dataset, padding short rows with Null and truncating long ones
    /// so every row matches the column set.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut cells| {
                cells.resize(width, Cell::Null);
                Row::new(cells)
            })
            .collect();
        Self { columns, rows }
    }

    /// Builds a dataset from keyed records. Columns come from the first
    /// record in key order; keys absent from later records read as Null and
    /// keys unknown to the first record are dropped.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Vec<(String, Cell)>>,
    {
        let mut records = records.into_iter();
        let Some(first) = records.next() else {
            return Self::default();
        };
        let mut columns = Vec::with_capacity(first.len());
        let mut first_cells = Vec::with_capacity(first.len());
        for (key, cell) in first {
            if columns.contains(&key) {
                continue;
            }
            columns.push(key);
            first_cells.push(cell);
        }
        let mut rows = vec![Row::new(first_cells)];
        for record in records {
            let mut keyed: HashMap<String, Cell> = record.into_iter().collect();
            let cells = columns
                .iter()
                .map(|column| keyed.remove(column).unwrap_or(Cell::Null))
                .collect();
            rows.push(Row::new(cells));
        }
        Self { columns, rows }
    }

    pub fn from_text(headers: Vec<String>, records: Vec<Vec<String>>) -> Self {
        let rows = records
            .into_iter()
            .map(|record| record.into_iter().map(Cell::Text).collect())
            .collect();
        Self::new(headers, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    pub fn value(&self, row: usize, column: &str) -> &Cell {
        match (self.rows.get(row), self.column_index(column)) {
            (Some(r), Some(idx)) => r.get(idx),
            _ => &NULL_CELL,
        }
    }

    pub fn column_cells<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a Cell> + use<'a> {
        let index = self.column_index(column);
        self.rows.iter().map(move |row| match index {
            Some(idx) => row.get(idx),
            None => &NULL_CELL,
        })
    }

    /// Replaces a single cell with `Text(value)`; the text is re-coerced on
    /// later reads rather than at write time.
    pub fn with_cell(&self, row: usize, column: &str, value: &str) -> Result<Dataset, ExploreError> {
        if row >= self.rows.len() {
            return Err(ExploreError::RowOutOfRange {
                index: row,
                len: self.rows.len(),
            });
        }
        let col_idx = self
            .column_index(column)
            .ok_or_else(|| ExploreError::UnknownColumn(column.to_string()))?;
        let mut next = self.clone();
        next.rows[row].cells[col_idx] = Cell::Text(value.to_string());
        Ok(next)
    }

    /// Returns a snapshot with `column` set to `cells`. An existing column of
    /// the same name is overwritten in place; otherwise it is appended.
    /// `cells` shorter than the row count leave the remainder Null.
    pub fn with_column(&self, column: &str, cells: Vec<Cell>) -> Dataset {
        let mut next = self.clone();
        let col_idx = match next.column_index(column) {
            Some(idx) => idx,
            None => {
                next.columns.push(column.to_string());
                for row in &mut next.rows {
                    row.cells.push(Cell::Null);
                }
                next.columns.len() - 1
            }
        };
        for (row, cell) in next.rows.iter_mut().zip(cells) {
            row.cells[col_idx] = cell;
        }
        next
    }
}
