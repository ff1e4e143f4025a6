//! Data layer: source access, schema normalization, coercion, filtering.
//!
//! Architecture:
//! ```text
//!  spreadsheet tab (strings)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  source   │  fetch → RawTable (retry once)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  schema   │  alias headers → canonical names
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  coerce   │  parse dates/numbers, drop bad rows → CleanedTable
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  date/category/direction predicate → filtered view
//!   └──────────┘
//! ```

pub mod coerce;
pub mod filter;
pub mod model;
pub mod schema;
pub mod source;

use crate::error::DashboardResult;

use model::CleanedTable;
use source::{fetch_with_retry, SheetKey, SheetSource};

/// Run the full load pipeline for one sheet tab: fetch, normalize headers,
/// coerce rows. This is what the cache invokes on a miss or expiry.
pub fn load_cleaned_table(
    source: &dyn SheetSource,
    key: &SheetKey,
) -> DashboardResult<CleanedTable> {
    let raw = fetch_with_retry(source, key)?;
    let normalized = schema::normalize_headers(raw)?;
    coerce::clean(&normalized)
}
