use chrono::{NaiveDate, NaiveDateTime};

use crate::error::DashboardResult;

use super::model::{CleanedTable, RawTable, StockRecord, UNDEFINED_CATEGORY};
use super::schema;

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Candidate date formats, tried in order; the first that parses wins.
/// Day-first numeric formats lead because the source data is Indonesian,
/// so "03/04/2025" reads as April 3rd.
pub const DATE_FORMATS: &[&str] = &[
    // Day-first numeric
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    // ISO / year-first
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    // Month-first US
    "%m/%d/%Y",
    "%m-%d-%Y",
    // Textual month names
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Fallback formats for cells that carry a timestamp rather than a bare date.
const DATETIME_FALLBACK_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Parse a date cell against [`DATE_FORMATS`], then the datetime fallbacks.
/// Returns `None` for anything that is not a valid calendar date, including
/// well-formed impossibilities such as "31-02-2025".
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FALLBACK_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

// ---------------------------------------------------------------------------
// Numeric parsing
// ---------------------------------------------------------------------------

/// Parse a numeric cell, tolerating locale variations.
///
/// Separator policy: when both `.` and `,` appear, the rightmost is the
/// decimal separator and the other marks thousands. A single separator
/// followed by exactly three digits is a thousands separator ("1.500" is
/// fifteen hundred), unless the integer part is a bare zero ("0.375").
pub fn parse_number(raw: &str) -> Option<f64> {
    let mut s: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    if s.is_empty() {
        return None;
    }

    // Currency prefix on value cells, e.g. "Rp1.500".
    let lowered = s.to_lowercase();
    if let Some(rest) = lowered.strip_prefix("rp") {
        s = rest.trim_start_matches('.').to_string();
    }

    let cleaned = match (s.rfind('.'), s.rfind(',')) {
        (None, None) => return s.parse::<f64>().ok(),
        (Some(dot), Some(comma)) => {
            let (decimal, thousands) = if dot > comma { ('.', ',') } else { (',', '.') };
            s.chars()
                .filter(|c| *c != thousands)
                .map(|c| if c == decimal { '.' } else { c })
                .collect::<String>()
        }
        (Some(_), None) => resolve_single_separator(&s, '.')?,
        (None, Some(_)) => resolve_single_separator(&s, ',')?,
    };

    cleaned.parse::<f64>().ok()
}

/// Decide whether a lone separator is a decimal point or a thousands mark.
fn resolve_single_separator(s: &str, sep: char) -> Option<String> {
    let count = s.matches(sep).count();
    let after_last = s.rsplit(sep).next().unwrap_or("");
    let before_first = s.split(sep).next().unwrap_or("");
    let int_part = before_first.trim_start_matches(['-', '+']);

    let is_thousands = count > 1 || (after_last.len() == 3 && int_part != "0");
    if is_thousands {
        // Thousands groups must all be three digits wide.
        let mut groups = s.split(sep);
        let _ = groups.next();
        if groups.any(|g| g.len() != 3 || !g.chars().all(|c| c.is_ascii_digit())) {
            return None;
        }
        Some(s.chars().filter(|c| *c != sep).collect())
    } else {
        Some(s.chars().map(|c| if c == sep { '.' } else { c }).collect())
    }
}

// ---------------------------------------------------------------------------
// Row coercion
// ---------------------------------------------------------------------------

/// Coerce a normalized table into a [`CleanedTable`].
///
/// Rows where any of date, qty or value fails to parse are dropped rather
/// than repaired; the count of dropped rows is recorded on the result and
/// logged. Rows that are entirely blank are skipped without counting.
pub fn clean(table: &RawTable) -> DashboardResult<CleanedTable> {
    let date_col = require_column(table, schema::DATE)?;
    let qty_col = require_column(table, schema::QTY_DELTA)?;
    let value_col = require_column(table, schema::VALUE_DELTA)?;
    let id_col = require_column(table, schema::PRODUCT_ID)?;
    let name_col = require_column(table, schema::PRODUCT_NAME)?;
    let category_col = table.column_index(schema::CATEGORY);

    let mut records = Vec::with_capacity(table.rows.len());
    let mut dropped = 0usize;

    for row in &table.rows {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let date = parse_date(table.cell(row, date_col));
        let qty_delta = parse_number(table.cell(row, qty_col));
        let value_delta = parse_number(table.cell(row, value_col));

        let (Some(date), Some(qty_delta), Some(value_delta)) = (date, qty_delta, value_delta)
        else {
            dropped += 1;
            continue;
        };

        let category = category_col
            .map(|c| table.cell(row, c).trim())
            .filter(|c| !c.is_empty())
            .unwrap_or(UNDEFINED_CATEGORY)
            .to_string();

        records.push(StockRecord {
            date,
            product_id: table.cell(row, id_col).trim().to_string(),
            product_name: table.cell(row, name_col).trim().to_string(),
            category,
            qty_delta,
            value_delta,
        });
    }

    if dropped > 0 {
        log::warn!(
            "dropped {dropped} of {} rows failing date/numeric coercion",
            table.rows.len()
        );
    }

    Ok(CleanedTable::from_records(records, dropped))
}

fn require_column(table: &RawTable, name: &'static str) -> DashboardResult<usize> {
    table
        .column_index(name)
        .ok_or(crate::error::DashboardError::MissingColumn(name))
}
