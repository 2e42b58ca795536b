//! # Application Configuration
//!
//! Loads the pipeline settings from, in increasing precedence: built-in
//! defaults, an optional YAML file (`vendorsum.yml` in the working directory,
//! or an explicit path), and `VENDORSUM_`-prefixed environment variables
//! (e.g. `VENDORSUM_DB_PATH`). A `.env` file is read first if present.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_DB_FILE, DEFAULT_LOG_DIR, DEFAULT_PREVIEW_ROWS, SUMMARY_TABLE,
};
use crate::errors::PipelineError;
use crate::summary::{RatioPolicy, SummaryOptions};
use config::{Config as ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// The name (without extension) of the optional config file in the working directory.
const DEFAULT_CONFIG_NAME: &str = "vendorsum";

/// The resolved pipeline configuration.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Directory scanned for raw CSV files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory where run logs are appended.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Table the vendor summary is written to.
    #[serde(default = "default_summary_table")]
    pub summary_table: String,
    #[serde(default)]
    pub ratio_policy: RatioPolicy,
    /// Rows logged after each summary stage.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

fn default_db_path() -> String {
    DEFAULT_DB_FILE.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}

fn default_summary_table() -> String {
    SUMMARY_TABLE.to_string()
}

fn default_preview_rows() -> usize {
    DEFAULT_PREVIEW_ROWS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            data_dir: default_data_dir(),
            log_dir: default_log_dir(),
            summary_table: default_summary_table(),
            ratio_policy: RatioPolicy::default(),
            preview_rows: default_preview_rows(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration.
    ///
    /// When `config_path` is given the file must exist; otherwise
    /// `vendorsum.yml` is used if it is present.
    pub fn load(config_path: Option<&Path>) -> Result<Self, PipelineError> {
        dotenvy::dotenv().ok();

        let mut builder = ConfigBuilder::builder();
        builder = match config_path {
            Some(path) => {
                info!("Loading configuration from '{}'.", path.display());
                builder.add_source(File::from(path).required(true))
            }
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false)),
        };

        let settings = builder
            .add_source(
                Environment::with_prefix("VENDORSUM")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// The summary settings described by this configuration.
    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            table_name: self.summary_table.clone(),
            policy: self.ratio_policy,
            preview_rows: self.preview_rows,
        }
    }
}
