use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}: expected a `results` array or a bare array of rows")]
    MissingResults(PathBuf),
    #[error("{path}: row {row}: {source}")]
    BadRow {
        path: PathBuf,
        row: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported input extension for {0} (expected .csv or .json)")]
    UnsupportedFormat(PathBuf),
    #[error("no records found in {0}")]
    Empty(String),
    #[error("row {row}: non-finite value in column {column}")]
    NonFinite { row: usize, column: &'static str },
    #[error("duplicate pivot entry at ({index} = {row_key}, {columns} = {col_key})")]
    DuplicatePivotEntry {
        index: &'static str,
        columns: &'static str,
        row_key: f64,
        col_key: f64,
    },
    #[error("{context} length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{context} needs at least {required} samples, got {got}")]
    TooFewSamples {
        context: &'static str,
        required: usize,
        got: usize,
    },
}
