//! Validate, Encode, Predict and Rank

use crate::artifact::ModelArtifact;
use crate::contributions::{global_importance, rank_contributions, Contribution, FeatureImportance};
use crate::model::LogisticModel;
use crate::{PredictionError, DEFAULT_TOP_K};
use feature_engine::{EncodedVector, FeatureEncoder, FeatureSchema};
use record_validator::{CustomerProfile, RawRecord, ValidationConfig, Validator};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Knobs that do not come from the training artifact
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub validation: ValidationConfig,
    /// Number of ranked contributions per prediction
    pub top_k: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Outcome of a single churn prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Probability of churn in [0, 1]
    pub churn_probability: f64,
    /// 1 when the customer is predicted to churn
    pub churn_class: u8,
    /// Non-zero features, largest absolute contribution first
    pub contributions: Vec<Contribution>,
    /// Validated record with derived attributes
    pub profile: CustomerProfile,
}

/// Immutable prediction pipeline built once from the training artifact
#[derive(Debug, Clone)]
pub struct ChurnPipeline {
    version: String,
    metrics: BTreeMap<String, f64>,
    validator: Validator,
    encoder: FeatureEncoder,
    model: LogisticModel,
    top_k: usize,
}

impl ChurnPipeline {
    /// Build the pipeline, checking schema and model against each other
    pub fn from_artifact(
        artifact: ModelArtifact,
        options: PipelineOptions,
    ) -> Result<Self, PredictionError> {
        let version = artifact.version.clone();
        let metrics = artifact.metrics.clone();
        let (schema, model) = artifact.into_parts()?;
        Ok(Self {
            version,
            metrics,
            validator: Validator::new(options.validation),
            encoder: FeatureEncoder::new(schema),
            model,
            top_k: options.top_k,
        })
    }

    /// Artifact version the pipeline was built from
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Training-time evaluation scores, empty when the artifact has none
    pub fn metrics(&self) -> &BTreeMap<String, f64> {
        &self.metrics
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.encoder.schema()
    }

    pub fn model(&self) -> &LogisticModel {
        &self.model
    }

    /// Validate a raw record and encode it
    pub fn encode(&self, record: &RawRecord) -> Result<(CustomerProfile, EncodedVector), PredictionError> {
        let profile = self.validator.validate(record)?;
        let vector = self.encoder.encode(&profile)?;
        Ok((profile, vector))
    }

    /// Full prediction for a raw record
    ///
    /// Either the whole result is produced or an error is returned.
    pub fn predict(&self, record: &RawRecord) -> Result<PredictionResult, PredictionError> {
        let (profile, vector) = self.encode(record)?;

        let churn_probability = self.model.predict_proba(&vector)?;
        let churn_class = self.model.predict(&vector)?;
        let contributions =
            rank_contributions(self.schema(), self.model.weights(), &vector, self.top_k)?;

        debug!(
            "Churn prediction: p={:.4}, class={}, top={:?}",
            churn_probability,
            churn_class,
            contributions.first().map(|c| c.feature.as_str())
        );

        Ok(PredictionResult {
            churn_probability,
            churn_class,
            contributions,
            profile,
        })
    }

    /// Features with the largest absolute coefficients
    pub fn global_importance(&self, top_k: usize) -> Vec<FeatureImportance> {
        global_importance(self.schema(), &self.model, top_k)
    }
}
