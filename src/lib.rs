//! Stock variance analytics core.
//!
//! Loads stock-count variance records from a spreadsheet-like source,
//! cleans them into a typed table, and serves the filter and aggregation
//! queries a dashboard needs. Rendering is someone else's job: every public
//! result here is an ordered table of primitive values.
//!
//! The load path is `data::load_cleaned_table`, normally reached through
//! [`cache::SheetCache`] so repeated interactions within the TTL reuse one
//! cleaned table. Interaction-driven queries go through
//! [`state::DashboardState`] or straight to the pure functions in
//! [`aggregate`].

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod summary;

pub use error::{DashboardError, DashboardResult};
