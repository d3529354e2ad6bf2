//! Error types for the rescission pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to the operator. Everything else is recovered locally
/// (bad dates, numbers and flags fall back to defaults).
#[derive(Debug, Error)]
pub enum RescissionError {
    /// Required canonical columns are absent after header normalization
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("table has no header row")]
    EmptyTable,

    #[error("unsupported input format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("spreadsheet read error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("spreadsheet write error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RescissionError>;
