//! Error types for slot-engine operations.

use thiserror::Error;

/// Errors that abort a grid build or a record-store operation.
#[derive(Error, Debug)]
pub enum GridError {
    /// The policy, window, or overrides violate an invariant the slot walk
    /// depends on (non-positive slot, inverted workday, and so on).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The record store could not supply the inputs.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by a [`RecordStore`](crate::store::RecordStore) implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Record not found in {table}: id={id}")]
    NotFound { table: String, id: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while writing CSV exports.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single appointment row was left out of the grid index.
///
/// Skips are not failures: the row is dropped and the build continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    #[error("invalid time in `{field}`: {value:?}")]
    InvalidTime { field: &'static str, value: String },

    #[error("end time {end} precedes start time {start}")]
    EndBeforeStart { start: String, end: String },

    #[error("date {0} is outside the query window")]
    OutsideWindow(String),

    #[error("belongs to professional {0:?}")]
    OtherProfessional(String),

    #[error("malformed record: {0}")]
    Malformed(String),
}

impl SkipReason {
    /// True for rows that were unusable, as opposed to rows that were valid
    /// but filtered out (other professional, outside the window).
    pub fn is_malformed(&self) -> bool {
        !matches!(
            self,
            SkipReason::OutsideWindow(_) | SkipReason::OtherProfessional(_)
        )
    }
}

/// Convenience alias used throughout slot-engine.
pub type Result<T> = std::result::Result<T, GridError>;
