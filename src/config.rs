//! Dashboard configuration: the scalar inputs of one deployment.

use serde::Deserialize;

use crate::aggregate::Metric;
use crate::error::DashboardResult;

fn default_tab() -> String {
    "Sheet1".to_string()
}

fn default_top_n() -> usize {
    10
}

fn default_cache_ttl_secs() -> u64 {
    600
}

/// Deployment configuration. Everything except the spreadsheet URL has a
/// default matching the original dashboard.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// URL-like handle of the spreadsheet to read.
    pub spreadsheet_url: String,

    /// Worksheet name within the spreadsheet.
    #[serde(default = "default_tab")]
    pub tab: String,

    /// Which variance metric charts rank by.
    #[serde(default)]
    pub metric: Metric,

    /// How many products the top-products ranking shows.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Cleaned-table time-to-live, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl DashboardConfig {
    pub fn from_json(text: &str) -> DashboardResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
