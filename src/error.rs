use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced while loading a booking file or configuring the analysis.
///
/// Malformed cells never show up here: the normalizer recovers them locally
/// by defaulting to zero.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The input file could not be opened or read.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension is not one the loader understands.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A spreadsheet workbook could not be opened or its sheet read.
    #[error("Failed to process the Excel file: {0}")]
    Workbook(#[from] calamine::Error),

    /// The workbook opened but holds no worksheet.
    #[error("Workbook has no worksheets: {0}")]
    EmptyWorkbook(PathBuf),

    /// A CSV document could not be parsed or written.
    #[error("Failed to process CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A JSON document could not be parsed or written.
    #[error("Failed to process JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An analysis setting is missing or out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
