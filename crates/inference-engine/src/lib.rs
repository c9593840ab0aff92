//! Churn Inference Engine
//!
//! Loads the trained logistic-regression artifact once and serves churn
//! probabilities with per-feature contribution rankings.

mod artifact;
mod contributions;
mod engine;
mod model;
mod pipeline;

pub use artifact::ModelArtifact;
pub use contributions::{global_importance, rank_contributions, Contribution, FeatureImportance};
pub use engine::{InferenceEngine, InferenceResult};
pub use model::LogisticModel;
pub use pipeline::{ChurnPipeline, PipelineOptions, PredictionResult};

use feature_engine::SchemaError;
use record_validator::ValidationError;
use thiserror::Error;

/// Default number of ranked contributions returned per prediction
pub const DEFAULT_TOP_K: usize = 10;

/// Errors during churn prediction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    /// Encoder invariant violated, the schema is malformed or stale
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaError),
    /// Artifact failed to load or is structurally invalid
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    /// Input record rejected before encoding
    #[error("Invalid attribute: {0}")]
    InvalidAttribute(#[from] ValidationError),
}

impl PredictionError {
    /// Short machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::SchemaMismatch(_) => "schema_mismatch",
            PredictionError::ModelUnavailable(_) => "model_unavailable",
            PredictionError::InvalidAttribute(_) => "invalid_attribute",
        }
    }
}
