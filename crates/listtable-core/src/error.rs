//! Error types for listtable-core

use crate::validate::ValidationReport;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in listtable-core
#[derive(Debug, Error)]
pub enum Error {
    /// The content is not a single list of rows
    #[error("{message} (received {observed})")]
    Structure { message: String, observed: String },

    /// Header and footer rows do not fit in the table
    #[error(
        "headerRows ({header_rows}) + footerRows ({footer_rows}) exceeds total rows ({total_rows})"
    )]
    Bounds {
        header_rows: usize,
        footer_rows: usize,
        total_rows: usize,
    },

    /// Strict validation rejected the table
    #[error("table has {} structural error(s)", .0.error_count())]
    Invalid(ValidationReport),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A resolved table is too wide to expand into slots
    #[error("table needs {width} columns, more than the {limit} a slot grid allows")]
    SlotGridTooWide { width: usize, limit: usize },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// A table option could not be understood
    #[error("invalid table option: {0}")]
    InvalidOption(String),

    /// Input format not recognised from the file extension
    #[error("unsupported input file '{0}'")]
    UnsupportedInput(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a structure error with the observed shape attached
    pub fn structure(message: impl Into<String>, observed: impl Into<String>) -> Self {
        Error::Structure {
            message: message.into(),
            observed: observed.into(),
        }
    }
}
