use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{CleanedTable, Direction, StockRecord};

// ---------------------------------------------------------------------------
// DateRange – a closed calendar interval
// ---------------------------------------------------------------------------

/// Closed date interval. `end` is inclusive through the end of that calendar
/// day; records carry bare dates, so a plain `<=` comparison absorbs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// A range covering exactly one day. Used when the caller supplies a
    /// single date instead of a pair.
    pub fn single(date: NaiveDate) -> Self {
        DateRange { start: date, end: date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ---------------------------------------------------------------------------
// Selection – a value set with an "all" sentinel
// ---------------------------------------------------------------------------

/// Which values of a field are selected. `All` means no restriction, the
/// typed equivalent of the dashboard's "Semua"/"All" multiselect entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T: Ord> {
    All,
    Only(BTreeSet<T>),
}

impl<T: Ord> Selection<T> {
    pub fn only(values: impl IntoIterator<Item = T>) -> Self {
        Selection::Only(values.into_iter().collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn allows(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.contains(value),
        }
    }
}

impl Selection<String> {
    /// Build a selection from UI labels, honoring the "All" sentinel entry
    /// (either English or the original dashboard's "Semua").
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for label in labels {
            let label = label.into();
            if label == "All" || label == "Semua" {
                return Selection::All;
            }
            set.insert(label);
        }
        Selection::Only(set)
    }
}

// ---------------------------------------------------------------------------
// FilterSelection – the full predicate
// ---------------------------------------------------------------------------

/// The current filter predicate: date window, category set, direction set.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    pub dates: DateRange,
    pub categories: Selection<String>,
    pub directions: Selection<Direction>,
}

impl FilterSelection {
    /// A selection matching every record of the table. Returns `None` for an
    /// empty table, which has no date span to cover.
    pub fn all_for(table: &CleanedTable) -> Option<Self> {
        let (start, end) = table.date_span?;
        Some(FilterSelection {
            dates: DateRange::new(start, end),
            categories: Selection::All,
            directions: Selection::All,
        })
    }

    pub fn matches(&self, record: &StockRecord) -> bool {
        self.dates.contains(record.date)
            && self.categories.allows(&record.category)
            && self.directions.allows(&record.direction())
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Indices of records passing the selection. An empty result is a valid
/// state, not an error.
pub fn filtered_indices(table: &CleanedTable, selection: &FilterSelection) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| selection.matches(record))
        .map(|(i, _)| i)
        .collect()
}

/// Borrow the records behind a set of indices, in index order.
pub fn view<'a>(table: &'a CleanedTable, indices: &[usize]) -> Vec<&'a StockRecord> {
    indices.iter().filter_map(|&i| table.records.get(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// One record per day of January 2025, categories alternating.
    fn january_table() -> CleanedTable {
        let records = (1..=31)
            .map(|day| StockRecord {
                date: date(2025, 1, day),
                product_id: format!("10{day:04}"),
                product_name: format!("Product {day}"),
                category: if day % 2 == 0 { "Food" } else { "Drinks" }.to_string(),
                qty_delta: day as f64,
                value_delta: if day % 3 == 0 { -(day as f64) } else { day as f64 },
            })
            .collect();
        CleanedTable::from_records(records, 0)
    }

    #[test]
    fn single_day_degenerate_range() {
        let table = january_table();
        let selection = FilterSelection {
            dates: DateRange::single(date(2025, 1, 10)),
            categories: Selection::from_labels(["All"]),
            directions: Selection::All,
        };

        let indices = filtered_indices(&table, &selection);
        let rows = view(&table, &indices);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, date(2025, 1, 10));
    }

    #[test]
    fn end_date_is_inclusive() {
        let table = january_table();
        let selection = FilterSelection {
            dates: DateRange::new(date(2025, 1, 1), date(2025, 1, 5)),
            categories: Selection::All,
            directions: Selection::All,
        };

        assert_eq!(filtered_indices(&table, &selection).len(), 5);
    }

    #[test]
    fn category_selection_restricts() {
        let table = january_table();
        let selection = FilterSelection {
            dates: DateRange::new(date(2025, 1, 1), date(2025, 1, 31)),
            categories: Selection::only(["Food".to_string()]),
            directions: Selection::All,
        };

        let indices = filtered_indices(&table, &selection);
        assert_eq!(indices.len(), 15);
        assert!(view(&table, &indices).iter().all(|r| r.category == "Food"));
    }

    #[test]
    fn direction_selection_restricts() {
        let table = january_table();
        let selection = FilterSelection {
            dates: DateRange::new(date(2025, 1, 1), date(2025, 1, 31)),
            categories: Selection::All,
            directions: Selection::only([Direction::Negative]),
        };

        let indices = filtered_indices(&table, &selection);
        // Days divisible by 3: 3, 6, ..., 30.
        assert_eq!(indices.len(), 10);
    }

    #[test]
    fn empty_result_is_valid() {
        let table = january_table();
        let selection = FilterSelection {
            dates: DateRange::new(date(2026, 1, 1), date(2026, 1, 31)),
            categories: Selection::All,
            directions: Selection::All,
        };

        assert!(filtered_indices(&table, &selection).is_empty());
    }

    #[test]
    fn semua_label_means_all() {
        assert!(Selection::from_labels(["Semua"]).is_all());
        assert!(Selection::from_labels(["Food", "All"]).is_all());
        assert!(!Selection::from_labels(["Food"]).is_all());
    }

    #[test]
    fn all_for_covers_whole_table() {
        let table = january_table();
        let selection = FilterSelection::all_for(&table).unwrap();
        assert_eq!(filtered_indices(&table, &selection).len(), table.len());

        let empty = CleanedTable::from_records(Vec::new(), 0);
        assert!(FilterSelection::all_for(&empty).is_none());
    }
}
