use std::collections::HashMap;
use std::fmt;

use crate::error::{DashboardError, DashboardResult};

use super::model::RawTable;

// ---------------------------------------------------------------------------
// SheetKey – identifies one (source, tab) pair
// ---------------------------------------------------------------------------

/// Identifies a tab of a remote spreadsheet. Also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetKey {
    /// URL-like handle of the spreadsheet.
    pub source: String,
    /// Worksheet / tab name within the spreadsheet.
    pub tab: String,
}

impl SheetKey {
    pub fn new(source: impl Into<String>, tab: impl Into<String>) -> Self {
        SheetKey {
            source: source.into(),
            tab: tab.into(),
        }
    }
}

impl fmt::Display for SheetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.source, self.tab)
    }
}

// ---------------------------------------------------------------------------
// SheetSource – the transport boundary
// ---------------------------------------------------------------------------

/// Fetches a rectangular table of string cells for a sheet key.
///
/// Credentials and the network transport live behind implementations of this
/// trait; implementations are expected to enforce their own request timeout
/// so a fetch cannot block indefinitely.
pub trait SheetSource: Send + Sync {
    /// Fetch all rows of the given tab, header row first.
    fn fetch(&self, key: &SheetKey) -> DashboardResult<RawTable>;

    /// Stable name for logging.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// `"my_crate::module::MyType"` → `"MyType"`.
fn short_type_name(full: &str) -> &str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Fetch with a single retry. Transient source failures are retried once;
/// a second failure is surfaced as [`DashboardError::SourceUnavailable`].
pub fn fetch_with_retry(source: &dyn SheetSource, key: &SheetKey) -> DashboardResult<RawTable> {
    match source.fetch(key) {
        Ok(table) => Ok(table),
        Err(first) => {
            log::warn!("{} failed for {key}, retrying once: {first}", source.name());
            source.fetch(key).map_err(|second| {
                DashboardError::SourceUnavailable(format!("{key}: {second}"))
            })
        }
    }
}

// ---------------------------------------------------------------------------
// CsvSheetSource – in-memory CSV-backed source for tests and demos
// ---------------------------------------------------------------------------

/// A [`SheetSource`] backed by CSV text held in memory, one document per tab.
/// Stands in for the real spreadsheet transport in tests and offline demos.
#[derive(Debug, Default)]
pub struct CsvSheetSource {
    tabs: HashMap<String, String>,
}

impl CsvSheetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tab's CSV text under the given name.
    pub fn with_tab(mut self, tab: impl Into<String>, csv_text: impl Into<String>) -> Self {
        self.tabs.insert(tab.into(), csv_text.into());
        self
    }
}

impl SheetSource for CsvSheetSource {
    fn fetch(&self, key: &SheetKey) -> DashboardResult<RawTable> {
        let text = self.tabs.get(&key.tab).ok_or_else(|| {
            DashboardError::SourceUnavailable(format!("no such tab '{}'", key.tab))
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| DashboardError::SourceUnavailable(format!("bad header row: {e}")))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_no, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                DashboardError::SourceUnavailable(format!("row {}: {e}", row_no + 2))
            })?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(RawTable::new(headers, rows))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    const SAMPLE_CSV: &str = "\
Tanggal SO,PLU,DESCP,Tag,Selisih Qty (Pcs),Selisih Value (Rp)
01/03/2025,100001,INDOMIE GORENG,Food,-5,-12500
02/03/2025,200010,TEH BOTOL,Drinks,3,9000
";

    #[test]
    fn fetch_parses_headers_and_rows() {
        let source = CsvSheetSource::new().with_tab("Sheet1", SAMPLE_CSV);
        let key = SheetKey::new("sheet://demo", "Sheet1");

        let table = source.fetch(&key).unwrap();
        assert_eq!(table.headers.len(), 6);
        assert_eq!(table.headers[0], "Tanggal SO");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][3], "Drinks");
    }

    #[test]
    fn unknown_tab_is_unavailable() {
        let source = CsvSheetSource::new().with_tab("Sheet1", SAMPLE_CSV);
        let key = SheetKey::new("sheet://demo", "Nope");

        let err = source.fetch(&key).unwrap_err();
        assert!(matches!(err, DashboardError::SourceUnavailable(_)));
    }

    #[test]
    fn retry_recovers_from_one_transient_failure() {
        struct FlakySource {
            calls: AtomicUsize,
        }

        impl SheetSource for FlakySource {
            fn fetch(&self, _key: &SheetKey) -> DashboardResult<RawTable> {
                if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(DashboardError::SourceUnavailable("timeout".into()))
                } else {
                    Ok(RawTable::new(vec!["Tanggal SO".into()], Vec::new()))
                }
            }
        }

        let source = FlakySource {
            calls: AtomicUsize::new(0),
        };
        let key = SheetKey::new("sheet://demo", "Sheet1");

        let table = fetch_with_retry(&source, &key).unwrap();
        assert_eq!(table.headers, vec!["Tanggal SO"]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn retry_gives_up_after_second_failure() {
        struct DeadSource;

        impl SheetSource for DeadSource {
            fn fetch(&self, _key: &SheetKey) -> DashboardResult<RawTable> {
                Err(DashboardError::SourceUnavailable("credentials rejected".into()))
            }
        }

        let key = SheetKey::new("sheet://demo", "Sheet1");
        let err = fetch_with_retry(&DeadSource, &key).unwrap_err();
        assert!(matches!(err, DashboardError::SourceUnavailable(_)));
    }
}
