//! # Shared Constants
//!
//! Default locations and table names shared by the library and the CLI.

/// The default path for the inventory SQLite database.
pub const DEFAULT_DB_FILE: &str = "inventory.db";

/// The default directory scanned for raw CSV files.
pub const DEFAULT_DATA_DIR: &str = "data/data";

/// The directory where run logs are appended.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Log file for the `ingest` command.
pub const INGESTION_LOG_FILE: &str = "ingestion_db.log";

/// Log file for the `summarize` command.
pub const SUMMARY_LOG_FILE: &str = "get_vendor_summary.log";

/// Log file for the combined `run` command.
pub const PIPELINE_LOG_FILE: &str = "vendorsum.log";

/// The derived table written by the summarizer.
pub const SUMMARY_TABLE: &str = "vendor_sales_summary";

/// The file extension picked up by the loader.
pub const CSV_EXTENSION: &str = "csv";

/// The number of summary rows logged after each stage.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;
