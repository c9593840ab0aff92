//! Feature Engineering Engine
//!
//! Turns validated customer records into the numeric feature vectors the
//! churn model was trained on, and provides the summary statistics used by
//! the dataset analytics.

mod error;
mod features;
mod normalizer;
mod schema;
mod statistics;

pub use error::SchemaError;
pub use features::{EncodedVector, FeatureEncoder};
pub use normalizer::ScalingParams;
pub use schema::FeatureSchema;
pub use statistics::{pearson_correlation, SummaryStatistics};
