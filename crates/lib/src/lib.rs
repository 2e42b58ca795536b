//! # vendorsum
//!
//! Loads raw inventory CSV files into a local SQLite database and derives the
//! `vendor_sales_summary` table from the purchase, sales and freight data.
//!
//! The crate is organized around two entry points:
//!
//! 1.  [`ingest::load_raw_data`] scans a directory and writes every CSV file it
//!     finds into a table named after the file, replacing any previous table.
//! 2.  [`summary::run_summary`] aggregates the raw tables into one row per
//!     vendor and brand, cleans the result, adds the derived ratio columns and
//!     writes it back to the database.

pub mod config;
pub mod constants;
pub mod db;
pub mod errors;
pub mod ingest;
pub mod summary;
pub mod table;

pub use errors::PipelineError;
pub use ingest::{load_raw_data, IngestionReport};
pub use summary::{run_summary, RatioPolicy, SummaryOptions, SummaryReport, VendorSummary};
pub use table::{Cell, Table};
