//! Store error types

use crate::types::TripId;
use thiserror::Error;

/// Errors that can occur in the trip store
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite reported an error
    #[error("SQLite error: {0}")]
    Sqlite(#[source] rusqlite::Error),

    /// I/O operation failed (creating the database directory)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No trip with this id
    #[error("Trip not found: {0}")]
    NotFound(TripId),

    /// The tables are missing or do not match the expected layout
    #[error("Schema error: {0}")]
    Schema(String),

    /// A total time that is not `HH:MM:SS`
    #[error("Invalid total time: {0:?}")]
    InvalidTime(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.starts_with("no such table") => {
                StoreError::Schema(msg.clone())
            }
            _ => StoreError::Sqlite(err),
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound(42);
        assert_eq!(err.to_string(), "Trip not found: 42");

        let err = StoreError::InvalidTime("1:2".to_string());
        assert_eq!(err.to_string(), "Invalid total time: \"1:2\"");
    }

    #[test]
    fn test_missing_table_maps_to_schema_error() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err: StoreError = conn
            .query_row("SELECT COUNT(*) FROM trip_record", [], |row| row.get::<_, i64>(0))
            .unwrap_err()
            .into();
        assert!(matches!(err, StoreError::Schema(_)));
    }
}
