//! Runs the vendor summary aggregation.
//!
//! The freight, purchase and sales rollups and their left joins all run inside
//! one SQL statement, so key comparisons follow SQLite's affinity rules: a
//! `Brand` stored as text in `purchases` still matches an integer `Brand` in
//! `sales`. Unmatched rows carry `NULL` in the joined columns.

use super::sql::{JOINED_COLUMNS, VENDOR_SUMMARY_SQL};
use crate::db::query_table;
use crate::errors::PipelineError;
use crate::table::Table;
use tracing::debug;
use turso::Connection;

/// Runs the vendor summary query on `conn`.
///
/// The result has the columns of [`JOINED_COLUMNS`], ordered by
/// `TotalPurchaseDollars` descending with `NULL`s last.
pub async fn create_vendor_summary(conn: &Connection) -> Result<Table, PipelineError> {
    let summary = query_table(conn, VENDOR_SUMMARY_SQL).await?;
    for column in JOINED_COLUMNS {
        summary.column_index(column)?;
    }
    debug!("Vendor summary query returned {} rows.", summary.len());
    Ok(summary)
}
