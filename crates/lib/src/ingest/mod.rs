//! # Raw Data Ingestion
//!
//! Scans a directory for CSV files and writes each one into the database as a
//! table named after the file, replacing any table that already has that name.

pub mod reader;

pub use reader::{read_csv, sniff_column_kind, ColumnKind};

use crate::constants::CSV_EXTENSION;
use crate::db::Store;
use crate::errors::PipelineError;
use crate::table::Table;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;

/// One table written during an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedTable {
    pub file: PathBuf,
    pub table_name: String,
    pub rows: usize,
}

/// The outcome of [`load_raw_data`].
#[derive(Debug, Clone)]
pub struct IngestionReport {
    pub tables: Vec<IngestedTable>,
    pub elapsed: Duration,
}

/// Writes `table` as a full-replace table named `table_name`.
pub async fn ingest_table(
    store: &Store,
    table: &Table,
    table_name: &str,
) -> Result<usize, PipelineError> {
    store.replace_table(table_name, table).await
}

/// Loads every CSV file directly inside `data_dir` into `store`.
///
/// Files are visited in file-name order. The first file that fails to read or
/// write aborts the run; tables written before it are left in place.
pub async fn load_raw_data(store: &Store, data_dir: &Path) -> Result<IngestionReport, PipelineError> {
    let start = Instant::now();
    info!("---------Ingestion Started---------");

    let mut tables = Vec::new();
    for file in list_csv_files(data_dir)? {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let table_name = table_name_for(&file)?;

        let table = read_csv(&file)?;
        info!("Ingesting {file_name} in db");
        let rows = ingest_table(store, &table, &table_name).await?;

        tables.push(IngestedTable {
            file,
            table_name,
            rows,
        });
    }

    let elapsed = start.elapsed();
    info!("Ingestion Time: {} minutes", elapsed.as_secs_f64() / 60.0);
    info!("---------Ingestion Completed---------");

    Ok(IngestionReport { tables, elapsed })
}

/// Returns the CSV files directly inside `dir`, sorted by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(CSV_EXTENSION));
        if is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Derives the table name from a file path: the file name without its extension.
pub fn table_name_for(path: &Path) -> Result<String, PipelineError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| PipelineError::InvalidTableName(path.display().to_string()))
}
