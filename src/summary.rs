//! Optional text-commentary collaborator.
//!
//! The dashboard can ask an external text-generation service to narrate the
//! filtered data. The service is opaque behind [`Summarizer`]; when it fails
//! or is not configured the caller gets a visible notice string instead, and
//! nothing else on the dashboard is affected.

use std::fmt::Write as _;

use crate::aggregate::{GroupSummaryRow, Kpis, TopGroup};
use crate::error::DashboardResult;

// ---------------------------------------------------------------------------
// Summarizer – the collaborator boundary
// ---------------------------------------------------------------------------

/// Turns a natural-language prompt into free-form commentary text.
///
/// Implementations wrap whatever text-generation service is configured and
/// are expected to enforce their own request timeout.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, prompt: &str) -> DashboardResult<String>;

    /// Stable name for logging.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("Summarizer")
    }
}

// ---------------------------------------------------------------------------
// Prompt assembly
// ---------------------------------------------------------------------------

/// Build the commentary prompt from summary statistics: headline totals,
/// category rankings and the top products of the current view.
pub fn build_prompt(
    kpis: &Kpis,
    categories: &[GroupSummaryRow],
    top_products: &[TopGroup],
) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You are analyzing stock variance data from a retail stock count."
    );
    let _ = writeln!(
        prompt,
        "Total quantity variance: {:.0} pcs. Total value variance: Rp {:.0}.",
        kpis.total_qty_delta, kpis.total_value_delta
    );
    let _ = writeln!(prompt, "Products affected: {}.", kpis.distinct_products);

    if let Some((name, value)) = &kpis.biggest_category {
        let _ = writeln!(prompt, "Largest category variance: {name} (Rp {value:.0}).");
    }
    if let Some((name, value)) = &kpis.smallest_category {
        let _ = writeln!(prompt, "Smallest category variance: {name} (Rp {value:.0}).");
    }

    if !categories.is_empty() {
        let _ = writeln!(prompt, "Variance by category:");
        for row in categories {
            let _ = writeln!(
                prompt,
                "- {}: Rp {:.0} across {} rows",
                row.key, row.sum, row.count
            );
        }
    }

    if !top_products.is_empty() {
        let _ = writeln!(prompt, "Top products by absolute variance:");
        for group in top_products {
            let _ = writeln!(prompt, "- {}: Rp {:.0}", group.keys.join(" / "), group.sum);
        }
    }

    let _ = writeln!(
        prompt,
        "Write a short narrative summary of the main variance drivers and \
         anything that looks anomalous."
    );
    prompt
}

// ---------------------------------------------------------------------------
// Graceful degradation
// ---------------------------------------------------------------------------

/// Run the summarizer and degrade any failure to a user-visible notice.
/// `None` means no service is configured.
pub fn commentary(summarizer: Option<&dyn Summarizer>, prompt: &str) -> String {
    let Some(summarizer) = summarizer else {
        return "Automated commentary is not configured.".to_string();
    };

    match summarizer.summarize(prompt) {
        Ok(text) => text,
        Err(err) => {
            log::warn!("{} failed: {err}", summarizer.name());
            format!("Automated commentary is unavailable: {err}")
        }
    }
}
