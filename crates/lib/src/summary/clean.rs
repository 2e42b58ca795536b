//! Cleaning of the joined summary and the derived ratio columns.

use super::sql::{DERIVED_COLUMNS, JOINED_COLUMNS};
use crate::errors::PipelineError;
use crate::table::{Cell, Table};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// How the ratio columns treat a zero divisor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RatioPolicy {
    /// Plain float division: `x / 0` is infinite and `0 / 0` is NaN.
    #[default]
    Propagate,
    /// A zero divisor yields `0.0`.
    ZeroGuarded,
}

impl RatioPolicy {
    pub fn divide(self, numerator: f64, denominator: f64) -> f64 {
        match self {
            RatioPolicy::ZeroGuarded if denominator == 0.0 => 0.0,
            _ => numerator / denominator,
        }
    }
}

impl FromStr for RatioPolicy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "propagate" => Ok(RatioPolicy::Propagate),
            "zero-guarded" | "zero_guarded" | "zero" => Ok(RatioPolicy::ZeroGuarded),
            other => Err(PipelineError::Config(format!(
                "Unknown ratio policy '{other}'. Expected 'propagate' or 'zero-guarded'."
            ))),
        }
    }
}

impl fmt::Display for RatioPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioPolicy::Propagate => write!(f, "propagate"),
            RatioPolicy::ZeroGuarded => write!(f, "zero-guarded"),
        }
    }
}

/// One cleaned row of `vendor_sales_summary`.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorSummary {
    pub vendor_number: Cell,
    pub vendor_name: String,
    pub brand: Cell,
    pub description: String,
    pub purchase_price: f64,
    pub volume: f64,
    pub actual_price: f64,
    pub total_purchase_quantity: f64,
    pub total_purchase_dollars: f64,
    pub total_sales_dollars: f64,
    pub total_sales_quantity: f64,
    pub total_sales_price: f64,
    pub total_excise_tax: f64,
    pub freight_cost: f64,
    pub gross_profit: f64,
    pub profit_margin: f64,
    pub stock_turnover: f64,
    pub sales_to_purchase_ratio: f64,
}

impl VendorSummary {
    /// Fills in the four derived columns from the aggregated ones.
    fn derive(&mut self, policy: RatioPolicy) {
        self.gross_profit = self.total_sales_dollars - self.total_purchase_dollars;
        self.profit_margin = policy.divide(self.gross_profit, self.total_sales_dollars) * 100.0;
        self.stock_turnover =
            policy.divide(self.total_sales_quantity, self.total_purchase_quantity);
        self.sales_to_purchase_ratio =
            policy.divide(self.total_sales_dollars, self.total_purchase_dollars);
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.vendor_number.clone(),
            Cell::Text(self.vendor_name.clone()),
            self.brand.clone(),
            Cell::Text(self.description.clone()),
            Cell::Real(self.purchase_price),
            Cell::Real(self.volume),
            Cell::Real(self.actual_price),
            Cell::Real(self.total_purchase_quantity),
            Cell::Real(self.total_purchase_dollars),
            Cell::Real(self.total_sales_dollars),
            Cell::Real(self.total_sales_quantity),
            Cell::Real(self.total_sales_price),
            Cell::Real(self.total_excise_tax),
            Cell::Real(self.freight_cost),
            Cell::Real(self.gross_profit),
            Cell::Real(self.profit_margin),
            Cell::Real(self.stock_turnover),
            Cell::Real(self.sales_to_purchase_ratio),
        ]
    }

    /// Converts cleaned rows into a table with the summary's column order.
    pub fn to_table(rows: &[VendorSummary]) -> Table {
        let columns: Vec<String> = JOINED_COLUMNS
            .iter()
            .chain(DERIVED_COLUMNS.iter())
            .map(|c| c.to_string())
            .collect();
        let mut table = Table::from_rows(columns, rows.iter().map(Self::cells).collect());
        // Numeric columns stay REAL even when there are no rows to infer from.
        for ty in table.column_types.iter_mut().skip(4) {
            *ty = "REAL";
        }
        table
    }
}

/// Cleans the joined summary and adds the derived columns.
///
/// Numeric columns are coerced to floats (text that is not a number is an
/// error), `NULL`s become zero (or an empty string for text), and
/// `VendorName` and `Description` are trimmed.
pub fn clean_data(
    summary: &Table,
    policy: RatioPolicy,
) -> Result<Vec<VendorSummary>, PipelineError> {
    let idx: Vec<usize> = JOINED_COLUMNS
        .iter()
        .map(|c| summary.column_index(c))
        .collect::<Result<_, _>>()?;

    let number = |row: &[Cell], pos: usize| -> Result<f64, PipelineError> {
        Ok(row[idx[pos]].to_f64(JOINED_COLUMNS[pos])?.unwrap_or(0.0))
    };
    let text = |row: &[Cell], pos: usize| -> String {
        row[idx[pos]]
            .to_text()
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };
    let key = |row: &[Cell], pos: usize| -> Cell {
        match &row[idx[pos]] {
            Cell::Null => Cell::Integer(0),
            other => other.clone(),
        }
    };

    summary
        .rows
        .iter()
        .map(|row| {
            let row = row.as_slice();
            let mut cleaned = VendorSummary {
                vendor_number: key(row, 0),
                vendor_name: text(row, 1),
                brand: key(row, 2),
                description: text(row, 3),
                purchase_price: number(row, 4)?,
                volume: number(row, 5)?,
                actual_price: number(row, 6)?,
                total_purchase_quantity: number(row, 7)?,
                total_purchase_dollars: number(row, 8)?,
                total_sales_dollars: number(row, 9)?,
                total_sales_quantity: number(row, 10)?,
                total_sales_price: number(row, 11)?,
                total_excise_tax: number(row, 12)?,
                freight_cost: number(row, 13)?,
                gross_profit: 0.0,
                profit_margin: 0.0,
                stock_turnover: 0.0,
                sales_to_purchase_ratio: 0.0,
            };
            cleaned.derive(policy);
            Ok(cleaned)
        })
        .collect()
}
