//! Training Artifact Loading
//!
//! The artifact is a single JSON document written by the offline training
//! job. Column order, scaling statistics and coefficients travel together,
//! so schema and model can never be deployed out of step.

use crate::model::LogisticModel;
use crate::PredictionError;
use feature_engine::{FeatureSchema, ScalingParams};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Serialized output of model training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Training run identifier
    pub version: String,
    /// Model input columns in training order
    pub feature_columns: Vec<String>,
    /// Z-score statistics per numeric column
    pub scaling: BTreeMap<String, ScalingParams>,
    /// One weight per feature column
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Reference level dropped per categorical attribute
    #[serde(default)]
    pub baselines: BTreeMap<String, String>,
    /// Holdout scores recorded at training time, e.g. `roc_auc`
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

impl ModelArtifact {
    /// Read and parse an artifact file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PredictionError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PredictionError::ModelUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let artifact = Self::from_json(&json)?;
        info!(
            "Loaded model artifact {} from {} ({} features)",
            artifact.version,
            path.display(),
            artifact.feature_columns.len()
        );
        Ok(artifact)
    }

    /// Parse an artifact from JSON text
    pub fn from_json(json: &str) -> Result<Self, PredictionError> {
        serde_json::from_str(json)
            .map_err(|e| PredictionError::ModelUnavailable(format!("malformed artifact: {}", e)))
    }

    /// Split into the validated feature schema and classifier
    pub fn into_parts(self) -> Result<(FeatureSchema, LogisticModel), PredictionError> {
        let schema = FeatureSchema::new(self.feature_columns, self.scaling)?
            .with_baselines(&self.baselines)?;

        if self.coefficients.len() != schema.len() {
            return Err(PredictionError::ModelUnavailable(format!(
                "artifact has {} coefficients for {} feature columns",
                self.coefficients.len(),
                schema.len()
            )));
        }

        let model = LogisticModel::new(self.coefficients, self.intercept)?;
        Ok((schema, model))
    }
}
