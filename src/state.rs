use std::collections::BTreeSet;
use std::sync::Arc;

use crate::aggregate::{
    self, GroupField, Kpis, Metric, TopGroup, TrendSeries,
};
use crate::data::filter::{filtered_indices, view, DateRange, FilterSelection, Selection};
use crate::data::model::{CleanedTable, Direction, StockRecord};

// ---------------------------------------------------------------------------
// Interaction state
// ---------------------------------------------------------------------------

/// The dashboard's interaction state, independent of any rendering layer.
///
/// Owns a handle to the current cleaned table plus the user's selections,
/// and keeps the visible-row index cache in sync with them. Every selection
/// change triggers a full synchronous recompute of the visible set.
pub struct DashboardState {
    /// Current cleaned table (None until the first successful load).
    pub table: Option<Arc<CleanedTable>>,

    /// Active filter predicate (None while no table is loaded).
    pub selection: Option<FilterSelection>,

    /// Which metric the charts rank by.
    pub metric: Metric,

    /// How many products the top-products ranking shows.
    pub top_n: usize,

    /// Indices of records passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// Status / error message to show in the UI.
    pub status_message: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            table: None,
            selection: None,
            metric: Metric::Value,
            top_n: 10,
            visible_indices: Vec::new(),
            status_message: None,
        }
    }
}

impl DashboardState {
    /// Ingest a freshly loaded table and reset the selection to cover it.
    pub fn set_table(&mut self, table: Arc<CleanedTable>) {
        self.selection = FilterSelection::all_for(&table);
        self.visible_indices = (0..table.len()).collect();
        self.table = Some(table);
        self.status_message = None;
    }

    /// Recompute `visible_indices` after a selection change.
    pub fn refilter(&mut self) {
        if let (Some(table), Some(selection)) = (&self.table, &self.selection) {
            self.visible_indices = filtered_indices(table, selection);
        } else {
            self.visible_indices.clear();
        }
    }

    /// Set the date window and refilter.
    pub fn set_date_range(&mut self, dates: DateRange) {
        if let Some(selection) = &mut self.selection {
            selection.dates = dates;
            self.refilter();
        }
    }

    /// Toggle a single category in the selection. Toggling while every
    /// category is selected narrows to "all but this one".
    pub fn toggle_category(&mut self, category: &str) {
        let Some(table) = &self.table else { return };
        let Some(selection) = &mut self.selection else {
            return;
        };

        let mut set: BTreeSet<String> = match &selection.categories {
            Selection::All => table.categories.clone(),
            Selection::Only(set) => set.clone(),
        };
        if !set.remove(category) {
            set.insert(category.to_string());
        }
        selection.categories = Selection::Only(set);
        self.refilter();
    }

    /// Toggle a direction in the selection.
    pub fn toggle_direction(&mut self, direction: Direction) {
        let Some(selection) = &mut self.selection else {
            return;
        };

        let mut set: BTreeSet<Direction> = match &selection.directions {
            Selection::All => [Direction::Positive, Direction::Negative, Direction::Neutral]
                .into_iter()
                .collect(),
            Selection::Only(set) => set.clone(),
        };
        if !set.remove(&direction) {
            set.insert(direction);
        }
        selection.directions = Selection::Only(set);
        self.refilter();
    }

    /// Select every category again.
    pub fn select_all_categories(&mut self) {
        if let Some(selection) = &mut self.selection {
            selection.categories = Selection::All;
            self.refilter();
        }
    }

    /// Borrow the currently visible records.
    pub fn visible(&self) -> Vec<&StockRecord> {
        match &self.table {
            Some(table) => view(table, &self.visible_indices),
            None => Vec::new(),
        }
    }

    // -- Aggregations over the visible view --

    pub fn kpis(&self) -> Kpis {
        aggregate::kpis(&self.visible())
    }

    pub fn category_summary(&self) -> Vec<aggregate::GroupSummaryRow> {
        aggregate::group_summary(&self.visible(), GroupField::Category, self.metric)
    }

    pub fn top_products(&self) -> Vec<TopGroup> {
        aggregate::top_n(
            &self.visible(),
            &[GroupField::ProductId, GroupField::ProductName],
            self.metric,
            self.top_n,
        )
    }

    pub fn trend(&self) -> Option<TrendSeries> {
        aggregate::adaptive_trend(&self.visible(), self.metric)
    }

    pub fn outliers(&self) -> Vec<&StockRecord> {
        match &self.table {
            Some(table) => {
                aggregate::outliers_iqr(&view(table, &self.visible_indices), self.metric)
            }
            None => Vec::new(),
        }
    }
}
