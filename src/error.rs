//! Error types for the predexport crate

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the predexport crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("batch {batch}: field '{field}' has {got} values but 'id' has {expected}")]
    LengthMismatch {
        batch: usize,
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("batch {batch}: field '{field}' has shape {shape:?}, expected {expected}")]
    ShapeMismatch {
        batch: usize,
        field: &'static str,
        shape: Vec<usize>,
        expected: String,
    },

    #[error("batch {batch}: cannot take argmax over an empty class axis")]
    EmptyClassAxis { batch: usize },

    #[error("output directory {path:?} does not exist")]
    MissingOutputDirectory { path: PathBuf },

    #[error("invalid batch record on line {line}: {message}")]
    InvalidBatchRecord { line: usize, message: String },

    #[error("invalid tensor: {message}")]
    InvalidTensor { message: String },

    #[error("invalid reduction policy '{input}'. Expected one of: {expected}")]
    ParseReductionPolicy { input: String, expected: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
