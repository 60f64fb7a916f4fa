use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading artifacts or serving a prediction.
#[derive(Debug, Error)]
pub enum SalaryError {
    #[error("artifact not found: {}", path.display())]
    ResourceNotFound { path: PathBuf },

    #[error("artifact {} is corrupt: {reason}", path.display())]
    ResourceCorrupt { path: PathBuf, reason: String },

    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("feature columns do not match the {context} schema: missing {missing:?}, unexpected {unexpected:?}")]
    SchemaMismatch {
        context: &'static str,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("{context} columns are out of order: expected {expected:?}, found {found:?}")]
    ColumnOrder {
        context: &'static str,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("unrecognized {field}: {value:?}")]
    UnrecognizedCategory { field: &'static str, value: String },

    #[error("{field} must be within {range}, got {value}")]
    InvalidInput {
        field: &'static str,
        value: String,
        range: &'static str,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl SalaryError {
    /// Caller-side problems that a corrected request can fix.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SalaryError::UnrecognizedCategory { .. } | SalaryError::InvalidInput { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SalaryError>;
