// src/data/error.rs

use thiserror::Error;

/// Failure taxonomy shared by the data service and the grid core.
#[derive(Error, Debug)]
pub enum DataError {
    /// Referenced table/row/column/cell does not exist. Terminal, never retried.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Malformed input, rejected before anything is written.
    #[error("Invalid input: {0}")]
    Validation(String),
    /// Service temporarily unable to answer (busy/locked database, worker gone).
    #[error("Service unavailable: {0}")]
    Transient(String),
    /// Bulk generation stopped part way; committed batches are kept.
    #[error("Bulk generation stopped after {created} rows: {reason}")]
    PartialBulk { created: u64, reason: String },
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

pub type DataResult<T> = Result<T, DataError>;

impl DataError {
    /// Whether a read that failed with this error may be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::Transient(_) => true,
            DataError::Sqlite(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }

    /// Short, user facing text for the notice line.
    pub fn user_message(&self) -> String {
        match self {
            DataError::NotFound(what) => format!("{} no longer exists", what),
            DataError::Validation(msg) => msg.clone(),
            DataError::PartialBulk { created, reason } => {
                format!("Generated {} rows before failing: {}", created, reason)
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_database_is_transient() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(DataError::from(busy).is_transient());
        assert!(DataError::Transient("worker gone".into()).is_transient());
        assert!(!DataError::NotFound("cell".into()).is_transient());
        assert!(!DataError::Validation("empty name".into()).is_transient());
    }

    #[test]
    fn partial_bulk_message_mentions_created_rows() {
        let err = DataError::PartialBulk {
            created: 2000,
            reason: "disk full".into(),
        };
        assert_eq!(err.user_message(), "Generated 2000 rows before failing: disk full");
    }
}
