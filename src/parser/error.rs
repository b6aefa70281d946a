//! Parser error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a trip export
#[derive(Error, Debug)]
pub enum ParseError {
    /// The file could not be opened or listed
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV structure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The metadata row after the header line is absent
    #[error("Missing trip metadata row")]
    MissingRow,

    /// A required column is absent on a line
    #[error("Line {line}: missing column {column}")]
    MissingColumn { line: u64, column: usize },

    /// A column holds something that is not a number
    #[error("Line {line}: invalid value {value:?} in column {column}")]
    InvalidValue {
        line: u64,
        column: usize,
        value: String,
    },

    /// Epoch milliseconds outside the representable date range
    #[error("Timestamp out of range: {0} ms")]
    InvalidTimestamp(i64),
}

/// Result type alias for parser operations
pub type ParseResult<T> = Result<T, ParseError>;
