//! # In-Memory Tables
//!
//! A small, ordered, column-named table used to move data between CSV files,
//! the database, and the summary step.

use crate::errors::PipelineError;
use std::fmt;
use turso::Value as TursoValue;

/// A single value in a [`Table`], mirroring SQLite's storage classes.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Coerces the cell to a float. `Null` yields `None`; text must parse as a number.
    pub fn to_f64(&self, column: &str) -> Result<Option<f64>, PipelineError> {
        match self {
            Cell::Null => Ok(None),
            Cell::Integer(i) => Ok(Some(*i as f64)),
            Cell::Real(f) => Ok(Some(*f)),
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| PipelineError::Coercion {
                        column: column.to_string(),
                        value: s.clone(),
                    })
            }
        }
    }

    /// Renders the cell as text. `Null` yields `None`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Integer(i) => Some(i.to_string()),
            Cell::Real(f) => Some(f.to_string()),
            Cell::Text(s) => Some(s.clone()),
        }
    }

    /// The SQLite column type used when a column is made only of this kind of cell.
    pub fn sql_type(&self) -> &'static str {
        match self {
            Cell::Integer(_) => "INTEGER",
            Cell::Real(_) => "REAL",
            Cell::Null | Cell::Text(_) => "TEXT",
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NULL"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Real(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<TursoValue> for Cell {
    fn from(value: TursoValue) -> Self {
        match value {
            TursoValue::Null => Cell::Null,
            TursoValue::Integer(i) => Cell::Integer(i),
            TursoValue::Real(f) => Cell::Real(f),
            TursoValue::Text(s) => Cell::Text(s),
            TursoValue::Blob(_) => Cell::Text("<blob>".to_string()),
        }
    }
}

impl From<&Cell> for TursoValue {
    fn from(cell: &Cell) -> Self {
        match cell {
            Cell::Null => TursoValue::Null,
            Cell::Integer(i) => TursoValue::Integer(*i),
            // SQLite has no NaN; it is stored as NULL.
            Cell::Real(f) if f.is_nan() => TursoValue::Null,
            Cell::Real(f) => TursoValue::Real(*f),
            Cell::Text(s) => TursoValue::Text(s.clone()),
        }
    }
}

/// An ordered set of named columns and the rows that fill them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    /// SQLite column type per column (`INTEGER`, `REAL` or `TEXT`).
    pub column_types: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates a table from rows, typing each column from the cells it holds.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let column_types = (0..columns.len())
            .map(|i| infer_column_type(rows.iter().map(|row| &row[i])))
            .collect();
        Self {
            columns,
            column_types,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the position of `name` in the column list.
    pub fn column_index(&self, name: &str) -> Result<usize, PipelineError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| PipelineError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Returns every value of the named column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&Cell>, PipelineError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Renders the first `n` rows as `column=value` lines for logging.
    pub fn head(&self, n: usize) -> String {
        self.rows
            .iter()
            .take(n)
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| format!("{c}={v}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Picks the narrowest SQLite type that fits every non-null cell.
///
/// Integer columns with gaps widen to `REAL`, matching how numeric columns
/// with missing values are stored as floats.
fn infer_column_type<'a>(cells: impl Iterator<Item = &'a Cell>) -> &'static str {
    let mut has_null = false;
    let mut kind: Option<&'static str> = None;
    for cell in cells {
        let next = match cell {
            Cell::Null => {
                has_null = true;
                continue;
            }
            Cell::Text(_) => return "TEXT",
            other => other.sql_type(),
        };
        kind = match (kind, next) {
            (None, k) => Some(k),
            (Some("INTEGER"), "INTEGER") => Some("INTEGER"),
            _ => Some("REAL"),
        };
    }
    match kind {
        Some("INTEGER") if has_null => "REAL",
        Some(k) => k,
        None => "TEXT",
    }
}
