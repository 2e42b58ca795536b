//! # Vendor Sales Summary
//!
//! Builds `vendor_sales_summary` from the raw `purchases`, `purchase_prices`,
//! `sales` and `vendor_invoice` tables:
//!
//! 1.  **Aggregation:** one SQL statement rolls up freight cost per vendor,
//!     purchase totals per vendor and brand, and sales totals per vendor and
//!     brand. The purchase rollup drives; sales and freight are left-joined, so
//!     every purchased vendor/brand appears exactly as often as it matches.
//! 2.  **Cleaning:** numeric coercion, null-to-zero fill, trimming, and the four
//!     derived ratio columns.
//! 3.  **Write:** the cleaned rows replace the summary table.

pub mod clean;
pub mod rollup;
pub mod sql;

pub use clean::{clean_data, RatioPolicy, VendorSummary};
pub use rollup::create_vendor_summary;

use crate::constants::{DEFAULT_PREVIEW_ROWS, SUMMARY_TABLE};
use crate::db::Store;
use crate::errors::PipelineError;
use std::time::{Duration, Instant};
use tracing::info;

/// Settings for one summary run.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    /// The table the cleaned summary is written to.
    pub table_name: String,
    pub policy: RatioPolicy,
    /// How many rows to log after the join and after cleaning.
    pub preview_rows: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            table_name: SUMMARY_TABLE.to_string(),
            policy: RatioPolicy::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

/// The outcome of [`run_summary`].
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub table_name: String,
    pub rows: usize,
    pub elapsed: Duration,
}

/// Creates, cleans and writes the vendor sales summary.
pub async fn run_summary(
    store: &Store,
    options: &SummaryOptions,
) -> Result<SummaryReport, PipelineError> {
    let start = Instant::now();
    let conn = store.connect()?;

    info!("Creating vendor summary");
    let summary = create_vendor_summary(&conn).await?;
    info!("\n{}", summary.head(options.preview_rows));

    info!("Cleaning data");
    let cleaned = clean_data(&summary, options.policy)?;
    let table = VendorSummary::to_table(&cleaned);
    info!("\n{}", table.head(options.preview_rows));

    info!("Ingesting data into database");
    let rows = store.replace_table(&options.table_name, &table).await?;
    info!("Data ingested successfully");

    let elapsed = start.elapsed();
    info!("Time taken: {} seconds", elapsed.as_secs_f64());

    Ok(SummaryReport {
        table_name: options.table_name.clone(),
        rows,
        elapsed,
    })
}
