//! Model Information Routes

use axum::{extract::State, Json};
use inference_engine::{FeatureImportance, DEFAULT_TOP_K};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::Result;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub version: String,
    pub feature_count: usize,
    pub intercept: f64,
    /// Largest absolute coefficients first
    pub importance: Vec<FeatureImportance>,
    /// Level each categorical coefficient is relative to
    pub baselines: BTreeMap<&'static str, &'static str>,
    /// Holdout scores from training
    pub metrics: BTreeMap<String, f64>,
}

/// Get model details and global feature importance
pub async fn get_model(State(state): State<Arc<AppState>>) -> Result<Json<ModelResponse>> {
    let pipeline = state.engine.pipeline()?;

    Ok(Json(ModelResponse {
        version: pipeline.version().to_string(),
        feature_count: pipeline.schema().len(),
        intercept: pipeline.model().intercept(),
        importance: pipeline.global_importance(DEFAULT_TOP_K),
        baselines: pipeline.schema().baselines(),
        metrics: pipeline.metrics().clone(),
    }))
}
