use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the ingestion and summary pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to get database connection: {0}")]
    Connection(String),
    #[error("The file '{}' has no data to ingest.", .0.display())]
    NoData(PathBuf),
    #[error("Invalid table name: '{0}'")]
    InvalidTableName(String),
    #[error("Column '{column}' is missing from the query result")]
    MissingColumn { column: String },
    #[error("Cannot convert value '{value}' in column '{column}' to a number")]
    Coercion { column: String, value: String },
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Config(err.to_string())
    }
}
