//! Inference Engine Implementation

use crate::artifact::ModelArtifact;
use crate::pipeline::{ChurnPipeline, PipelineOptions, PredictionResult};
use crate::PredictionError;
use record_validator::RawRecord;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Result of inference operation
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// The prediction
    pub prediction: PredictionResult,
    /// Time spent validating, encoding and scoring
    pub latency: Duration,
}

/// Process-wide inference engine
///
/// The artifact is loaded exactly once. When loading fails the engine stays
/// unavailable and every prediction reports `ModelUnavailable`; restarting
/// the process is the recovery path.
#[derive(Debug)]
pub struct InferenceEngine {
    /// Artifact path
    model_path: PathBuf,
    /// Loaded pipeline, or the reason it is unavailable
    state: Result<ChurnPipeline, PredictionError>,
}

impl InferenceEngine {
    /// Load the artifact at `model_path`
    pub fn load(model_path: impl AsRef<Path>, options: PipelineOptions) -> Self {
        let model_path = model_path.as_ref().to_path_buf();
        info!("Creating inference engine with model: {}", model_path.display());

        let state = ModelArtifact::from_path(&model_path)
            .and_then(|artifact| ChurnPipeline::from_artifact(artifact, options));

        match &state {
            Ok(pipeline) => info!(
                "Model {} ready with {} features",
                pipeline.version(),
                pipeline.schema().len()
            ),
            Err(e) => error!("Model unavailable, predictions disabled: {}", e),
        }

        Self { model_path, state }
    }

    /// Wrap an already built pipeline
    pub fn from_pipeline(pipeline: ChurnPipeline) -> Self {
        Self {
            model_path: PathBuf::from("memory"),
            state: Ok(pipeline),
        }
    }

    /// The loaded pipeline
    pub fn pipeline(&self) -> Result<&ChurnPipeline, PredictionError> {
        self.state.as_ref().map_err(|e| match e {
            PredictionError::ModelUnavailable(_) => e.clone(),
            other => PredictionError::ModelUnavailable(other.to_string()),
        })
    }

    /// Run a prediction on a raw record
    pub fn predict(&self, record: &RawRecord) -> Result<InferenceResult, PredictionError> {
        let start = Instant::now();
        let prediction = self.pipeline()?.predict(record)?;
        let latency = start.elapsed();
        debug!("Inference completed in {:?}", latency);

        Ok(InferenceResult {
            prediction,
            latency,
        })
    }

    /// Check if the model is loaded
    pub fn is_loaded(&self) -> bool {
        self.state.is_ok()
    }

    /// Get model path
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}
