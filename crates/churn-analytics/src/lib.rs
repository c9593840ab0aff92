//! Churn Dataset Analytics
//!
//! Descriptive statistics over the cleaned customer dataset: churn rates per
//! segment, filtered views, and the features most correlated with churn.

mod dataset;
mod drivers;
mod rates;

pub use dataset::{Column, ColumnData, Dataset, DatasetFilter, CHURN_COLUMN};
pub use drivers::{
    AddonCorrelation, Driver, DriverCorrelation, DriverSummary, EncodedColumn, DEFAULT_ADDON_COUNT,
};
pub use rates::{tenure_band, ChurnCounts, ChurnRate, ChurnSplit, ServiceUsage, TENURE_BANDS};

use thiserror::Error;

/// Errors while loading or analysing the dataset
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Failed to read dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("Dataset has no rows")]
    Empty,
    #[error("Column not found: {0}")]
    MissingColumn(String),
    #[error("Column {0} is not categorical")]
    NotCategorical(String),
    #[error("Row {row}: churn value {value:?} is not Yes/No")]
    InvalidChurnValue { row: usize, value: String },
}
