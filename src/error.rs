//! Error taxonomy for report generation.
//!
//! Only fatal startup and output conditions become `ReportError` and travel
//! up to `main`. Per-month and per-field problems are handled where they
//! occur: the affected month or field degrades to empty/`None` and a warning
//! is logged, so a single bad input never aborts a run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Configuration file not found: {0}")]
    ConfigMissing(PathBuf),

    #[error("Failed to read configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid month {0:?}: expected MM-YYYY or YYYY-MM")]
    InvalidMonth(String),

    #[error("Required configuration value missing: {0}")]
    MissingSetting(&'static str),

    #[error("Input file not found: {0}")]
    InputMissing(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Workbook write failed: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, ReportError>;
