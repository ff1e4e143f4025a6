//! Aggregation library: pure functions over a filtered view.
//!
//! Every function here takes borrowed records and shares no state; each call
//! is independently computable from its inputs. The presentation layer picks
//! whichever results it needs per interaction.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::data::model::StockRecord;

// ---------------------------------------------------------------------------
// Field selectors
// ---------------------------------------------------------------------------

/// Which variance metric an aggregation reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Monetary variance (`value_delta`).
    #[default]
    Value,
    /// Unit-count variance (`qty_delta`).
    Quantity,
}

impl Metric {
    pub fn of(&self, record: &StockRecord) -> f64 {
        match self {
            Metric::Value => record.value_delta,
            Metric::Quantity => record.qty_delta,
        }
    }
}

/// Which record field a grouping keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    ProductId,
    ProductName,
    Category,
    Direction,
}

impl GroupField {
    fn key_of(&self, record: &StockRecord) -> String {
        match self {
            GroupField::ProductId => record.product_id.clone(),
            GroupField::ProductName => record.product_name.clone(),
            GroupField::Category => record.category.clone(),
            GroupField::Direction => record.direction().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Group summary
// ---------------------------------------------------------------------------

/// Per-group sum, mean and row count for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummaryRow {
    pub key: String,
    pub sum: f64,
    pub mean: f64,
    pub count: usize,
}

/// Sum, mean and count of `metric` per distinct value of `group`, ordered
/// descending by absolute sum. Ties keep the groups' first-encounter order
/// (the sort is stable).
pub fn group_summary(
    rows: &[&StockRecord],
    group: GroupField,
    metric: Metric,
) -> Vec<GroupSummaryRow> {
    let mut order: Vec<GroupSummaryRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in rows {
        let key = group.key_of(record);
        let value = metric.of(record);
        match index.get(&key) {
            Some(&i) => {
                order[i].sum += value;
                order[i].count += 1;
            }
            None => {
                index.insert(key.clone(), order.len());
                order.push(GroupSummaryRow {
                    key,
                    sum: value,
                    mean: 0.0,
                    count: 1,
                });
            }
        }
    }

    for row in &mut order {
        row.mean = row.sum / row.count as f64;
    }
    order.sort_by(|a, b| b.sum.abs().total_cmp(&a.sum.abs()));
    order
}

// ---------------------------------------------------------------------------
// Top N
// ---------------------------------------------------------------------------

/// One ranked group: its key values (one per grouping field) and summed
/// metric. The sum keeps its sign; ranking uses the absolute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopGroup {
    pub keys: Vec<String>,
    pub sum: f64,
}

/// Sum `metric` per unique combination of `fields`, rank by absolute sum
/// descending, return the first `n`. Returns fewer rows when there are fewer
/// distinct groups; `n` larger than the group count is not an error.
pub fn top_n(
    rows: &[&StockRecord],
    fields: &[GroupField],
    metric: Metric,
    n: usize,
) -> Vec<TopGroup> {
    let mut order: Vec<TopGroup> = Vec::new();
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();

    for record in rows {
        let keys: Vec<String> = fields.iter().map(|f| f.key_of(record)).collect();
        let value = metric.of(record);
        match index.get(&keys) {
            Some(&i) => order[i].sum += value,
            None => {
                index.insert(keys.clone(), order.len());
                order.push(TopGroup { keys, sum: value });
            }
        }
    }

    order.sort_by(|a, b| b.sum.abs().total_cmp(&a.sum.abs()));
    order.truncate(n);
    order
}

// ---------------------------------------------------------------------------
// IQR outliers
// ---------------------------------------------------------------------------

/// Records whose metric falls outside the Tukey fences
/// `[Q1 − 1.5·IQR, Q3 + 1.5·IQR]`, sorted descending by the metric.
///
/// Fewer than two observations give no spread to measure, so the bounds
/// collapse and the outlier set is empty rather than an error.
pub fn outliers_iqr<'a>(rows: &[&'a StockRecord], metric: Metric) -> Vec<&'a StockRecord> {
    if rows.len() < 2 {
        return Vec::new();
    }

    let mut values: Vec<f64> = rows.iter().map(|r| metric.of(r)).collect();
    values.sort_by(f64::total_cmp);

    let q1 = quantile(&values, 0.25);
    let q3 = quantile(&values, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;

    let mut outliers: Vec<&StockRecord> = rows
        .iter()
        .copied()
        .filter(|r| {
            let v = metric.of(r);
            v < lower || v > upper
        })
        .collect();
    outliers.sort_by(|a, b| metric.of(b).total_cmp(&metric.of(a)));
    outliers
}

/// Linear-interpolation quantile over sorted values (the pandas default).
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

// ---------------------------------------------------------------------------
// Adaptive trend
// ---------------------------------------------------------------------------

/// Spans of at least this many whole days are bucketed by month instead of
/// by day.
pub const TREND_MONTHLY_THRESHOLD_DAYS: i64 = 45;

/// Width of the trailing moving-average window, in daily buckets.
pub const TREND_MOVING_AVG_WINDOW: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrendPoint {
    pub date: NaiveDate,
    pub total: f64,
    /// Trailing average over the last [`TREND_MOVING_AVG_WINDOW`] buckets;
    /// near the start it averages however many buckets exist so far.
    pub moving_avg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrendPoint {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

/// Time-bucketed trend of one metric, granularity chosen from the date span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TrendSeries {
    /// All records fall on one calendar day; there is no trend to draw.
    SingleDay { date: NaiveDate, total: f64 },
    /// Span below [`TREND_MONTHLY_THRESHOLD_DAYS`]: per-day sums plus a
    /// trailing moving average.
    Daily(Vec<DailyTrendPoint>),
    /// Longer spans: per-month sums, no moving average.
    Monthly(Vec<MonthlyTrendPoint>),
}

/// Bucket the view's metric over time. Returns `None` for an empty view.
pub fn adaptive_trend(rows: &[&StockRecord], metric: Metric) -> Option<TrendSeries> {
    let min_date = rows.iter().map(|r| r.date).min()?;
    let max_date = rows.iter().map(|r| r.date).max()?;
    let span_days = (max_date - min_date).num_days();

    if span_days == 0 {
        let total = rows.iter().map(|r| metric.of(r)).sum();
        return Some(TrendSeries::SingleDay {
            date: min_date,
            total,
        });
    }

    if span_days < TREND_MONTHLY_THRESHOLD_DAYS {
        let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in rows {
            *buckets.entry(record.date).or_default() += metric.of(record);
        }

        let totals: Vec<(NaiveDate, f64)> = buckets.into_iter().collect();
        let points = totals
            .iter()
            .enumerate()
            .map(|(i, &(date, total))| {
                let window_start = i.saturating_sub(TREND_MOVING_AVG_WINDOW - 1);
                let window = &totals[window_start..=i];
                let moving_avg =
                    window.iter().map(|(_, t)| t).sum::<f64>() / window.len() as f64;
                DailyTrendPoint {
                    date,
                    total,
                    moving_avg,
                }
            })
            .collect();
        Some(TrendSeries::Daily(points))
    } else {
        let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();
        for record in rows {
            let key = (record.date.year(), record.date.month());
            *buckets.entry(key).or_default() += metric.of(record);
        }

        let points = buckets
            .into_iter()
            .map(|((year, month), total)| MonthlyTrendPoint { year, month, total })
            .collect();
        Some(TrendSeries::Monthly(points))
    }
}

// ---------------------------------------------------------------------------
// KPI summary
// ---------------------------------------------------------------------------

/// Headline figures for a filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_qty_delta: f64,
    pub total_value_delta: f64,
    /// Count of distinct product codes in the view.
    pub distinct_products: usize,
    /// Category with the largest signed summed value delta.
    pub biggest_category: Option<(String, f64)>,
    /// Category with the smallest signed summed value delta.
    pub smallest_category: Option<(String, f64)>,
}

/// Compute the headline figures over a filtered view.
pub fn kpis(rows: &[&StockRecord]) -> Kpis {
    let total_qty_delta = rows.iter().map(|r| r.qty_delta).sum();
    let total_value_delta = rows.iter().map(|r| r.value_delta).sum();
    let distinct_products = rows
        .iter()
        .map(|r| r.product_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let by_category = group_summary(rows, GroupField::Category, Metric::Value);
    let biggest_category = by_category
        .iter()
        .max_by(|a, b| a.sum.total_cmp(&b.sum))
        .map(|row| (row.key.clone(), row.sum));
    let smallest_category = by_category
        .iter()
        .min_by(|a, b| a.sum.total_cmp(&b.sum))
        .map(|row| (row.key.clone(), row.sum));

    Kpis {
        total_qty_delta,
        total_value_delta,
        distinct_products,
        biggest_category,
        smallest_category,
    }
}
