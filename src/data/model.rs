use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// Category label substituted when the source cell is absent or blank.
pub const UNDEFINED_CATEGORY: &str = "Undefined";

// ---------------------------------------------------------------------------
// RawTable – a rectangular table of string cells, straight from the source
// ---------------------------------------------------------------------------

/// An untyped table as fetched from the spreadsheet source: one header row
/// plus zero or more data rows of string cells. Rows may be ragged; a missing
/// cell reads as an empty string.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        RawTable { headers, rows }
    }

    /// Index of the column with the given header, if present.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell at (row, col), empty string when the row is too short.
    pub fn cell<'a>(&'a self, row: &'a [String], col: usize) -> &'a str {
        row.get(col).map(String::as_str).unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Direction – sign of the value variance
// ---------------------------------------------------------------------------

/// Sign of a record's monetary variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Direction {
    Positive,
    Negative,
    Neutral,
}

impl Direction {
    /// Classify a value delta by its sign.
    pub fn from_value_delta(value_delta: f64) -> Self {
        if value_delta > 0.0 {
            Direction::Positive
        } else if value_delta < 0.0 {
            Direction::Negative
        } else {
            Direction::Neutral
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Positive => write!(f, "Positive"),
            Direction::Negative => write!(f, "Negative"),
            Direction::Neutral => write!(f, "Neutral"),
        }
    }
}

// ---------------------------------------------------------------------------
// StockRecord – one fully-coerced row
// ---------------------------------------------------------------------------

/// A single stock-count variance record. Every field is already validated:
/// rows that fail date or numeric coercion never become a `StockRecord`.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRecord {
    /// Date of the stock count event.
    pub date: NaiveDate,
    /// Product lookup code. Not unique across rows (one per count event).
    pub product_id: String,
    /// Human-readable product description.
    pub product_name: String,
    /// Grouping label; [`UNDEFINED_CATEGORY`] when the source was blank.
    pub category: String,
    /// Signed quantity variance in units.
    pub qty_delta: f64,
    /// Signed monetary variance.
    pub value_delta: f64,
}

impl StockRecord {
    pub fn abs_qty_delta(&self) -> f64 {
        self.qty_delta.abs()
    }

    pub fn abs_value_delta(&self) -> f64 {
        self.value_delta.abs()
    }

    /// Direction derived from the sign of `value_delta`.
    pub fn direction(&self) -> Direction {
        Direction::from_value_delta(self.value_delta)
    }
}

// ---------------------------------------------------------------------------
// CleanedTable – the full set of valid records for one (source, tab)
// ---------------------------------------------------------------------------

/// The cleaned dataset with pre-computed indexes. Immutable once built; a
/// refreshed load produces a new table rather than mutating this one.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    /// All valid records, in source order.
    pub records: Vec<StockRecord>,
    /// Sorted set of distinct category labels.
    pub categories: BTreeSet<String>,
    /// Earliest and latest record dates, `None` when the table is empty.
    pub date_span: Option<(NaiveDate, NaiveDate)>,
    /// Number of source rows excluded because date or numeric coercion
    /// failed. Kept observable so data-quality problems are not silent.
    pub dropped_rows: usize,
}

impl CleanedTable {
    /// Build the indexes from coerced records.
    pub fn from_records(records: Vec<StockRecord>, dropped_rows: usize) -> Self {
        let categories: BTreeSet<String> =
            records.iter().map(|r| r.category.clone()).collect();

        let date_span = records.iter().map(|r| r.date).fold(
            None::<(NaiveDate, NaiveDate)>,
            |span, d| {
            Some(match span {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            })
        },
        );

        CleanedTable {
            records,
            categories,
            date_span,
            dropped_rows,
        }
    }

    /// Number of valid records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
