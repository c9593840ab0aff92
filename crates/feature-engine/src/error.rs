//! Schema Error Types

use thiserror::Error;

/// The feature schema is malformed or does not fit the encoder
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Feature schema has no columns")]
    Empty,

    #[error("Duplicate feature column: {0}")]
    DuplicateColumn(String),

    #[error("Numeric feature column missing from schema: {0}")]
    MissingColumn(String),

    #[error("Scaling parameters missing for numeric column: {0}")]
    MissingScaling(String),

    #[error("Invalid scaling for {column}: mean={mean}, std={std} (std must be finite and > 0)")]
    InvalidScaling { column: String, mean: f64, std: f64 },

    #[error("Baseline declared for unknown categorical attribute: {0}")]
    UnknownBaselineAttribute(String),

    #[error("Baseline {value:?} is not a valid {attribute} value")]
    InvalidBaseline { attribute: String, value: String },

    #[error("Baseline {attribute}={value:?} must not have its own column")]
    BaselineHasColumn { attribute: String, value: String },

    #[error("Encoded vector has {actual} values, schema has {expected} columns")]
    LengthMismatch { expected: usize, actual: usize },
}
