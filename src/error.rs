use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyedFrameError {
    /// A requested key column is not a column of the wrapped table.
    #[error("Validation error: key columns must be a subset of table columns (missing: {0})")]
    Validation(String),

    /// Anything the underlying polars frame reports, passed through as-is.
    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error("Row index {index} out of bounds for frame of height {height}")]
    RowOutOfBounds { index: usize, height: usize },

    #[error("Invalid column permutation: {0}")]
    InvalidPermutation(String),

    #[error("Join requires at least one join column")]
    NoJoinColumns,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KeyedFrameError {
    pub fn is_validation(&self) -> bool {
        matches!(self, KeyedFrameError::Validation(_))
    }

    pub fn is_delegated(&self) -> bool {
        matches!(self, KeyedFrameError::Polars(_))
    }
}

pub type Result<T> = std::result::Result<T, KeyedFrameError>;
