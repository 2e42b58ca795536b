//! CSV parsing with per-column type sniffing.

use crate::errors::PipelineError;
use crate::table::{Cell, Table};
use std::path::Path;
use tracing::debug;

/// The storage type sniffed for one CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
}

impl ColumnKind {
    fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "REAL",
            ColumnKind::Text => "TEXT",
        }
    }
}

/// Reads a CSV file with a header row into a [`Table`].
///
/// Empty fields become `NULL`. Every column is typed from all of its values,
/// see [`sniff_column_kind`].
pub fn read_csv(path: &Path) -> Result<Table, PipelineError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(PipelineError::NoData(path.to_path_buf()));
    }

    let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    debug!(
        "[read_csv] Parsed {} records with {} columns from '{}'.",
        records.len(),
        headers.len(),
        path.display()
    );

    let kinds: Vec<ColumnKind> = (0..headers.len())
        .map(|i| sniff_column_kind(records.iter().map(|r| r.get(i).unwrap_or(""))))
        .collect();

    let rows = records
        .iter()
        .map(|record| {
            kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| parse_field(record.get(i).unwrap_or(""), *kind))
                .collect()
        })
        .collect();

    Ok(Table {
        columns: headers,
        column_types: kinds.iter().map(|k| k.sql_type()).collect(),
        rows,
    })
}

/// Infers a column's storage type from every one of its raw values.
///
/// A column is `Integer` only when every field is a non-empty integer; integer
/// columns with blanks widen to `Real`. A column with no values at all is `Text`.
pub fn sniff_column_kind<'a>(fields: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut seen_value = false;
    let mut has_blank = false;
    let mut all_integer = true;

    for field in fields {
        let field = field.trim();
        if field.is_empty() {
            has_blank = true;
            continue;
        }
        seen_value = true;
        if field.parse::<i64>().is_ok() {
            continue;
        }
        if field.parse::<f64>().is_ok() {
            all_integer = false;
            continue;
        }
        return ColumnKind::Text;
    }

    match (seen_value, all_integer && !has_blank) {
        (false, _) => ColumnKind::Text,
        (true, true) => ColumnKind::Integer,
        (true, false) => ColumnKind::Real,
    }
}

fn parse_field(field: &str, kind: ColumnKind) -> Cell {
    if field.trim().is_empty() {
        return Cell::Null;
    }
    match kind {
        ColumnKind::Integer => field
            .trim()
            .parse::<i64>()
            .map(Cell::Integer)
            .unwrap_or_else(|_| Cell::Text(field.to_string())),
        ColumnKind::Real => field
            .trim()
            .parse::<f64>()
            .map(Cell::Real)
            .unwrap_or_else(|_| Cell::Text(field.to_string())),
        ColumnKind::Text => Cell::Text(field.to_string()),
    }
}
