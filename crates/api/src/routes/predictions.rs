//! Prediction Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use inference_engine::PredictionResult;
use record_validator::{CustomerType, RawRecord};
use risk_alerting::RiskAssessment;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ApiError, Result};
use crate::AppState;

/// Derived attributes shown next to the prediction
#[derive(Debug, Serialize)]
pub struct ProfileSummary {
    pub customer_type: CustomerType,
    pub num_internet_services: u8,
}

/// Response for the predict endpoint
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub model_version: String,
    #[serde(flatten)]
    pub prediction: PredictionResult,
    pub risk: RiskAssessment,
    pub profile_summary: ProfileSummary,
    pub latency_ms: f64,
}

/// Score one customer record
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<RawRecord>, JsonRejection>,
) -> Result<Json<PredictResponse>> {
    let result = body
        .map_err(ApiError::from)
        .and_then(|Json(record)| state.engine.predict(&record).map_err(ApiError::from));
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            let (_, kind) = e.status_and_kind();
            metrics::counter!("churn_prediction_errors_total", "kind" => kind).increment(1);
            return Err(e);
        }
    };

    let prediction = result.prediction;
    let risk = state.risk.assess(prediction.churn_probability);

    metrics::counter!("churn_predictions_total", "tier" => risk.tier.as_str()).increment(1);
    metrics::histogram!("churn_prediction_latency_seconds").record(result.latency.as_secs_f64());
    debug!(
        "Predicted p={:.4} tier={} in {:?}",
        prediction.churn_probability,
        risk.tier.as_str(),
        result.latency
    );

    let profile_summary = ProfileSummary {
        customer_type: prediction.profile.customer_type(),
        num_internet_services: prediction.profile.num_internet_services(),
    };

    Ok(Json(PredictResponse {
        model_version: state.engine.pipeline()?.version().to_string(),
        prediction,
        risk,
        profile_summary,
        latency_ms: result.latency.as_secs_f64() * 1000.0,
    }))
}
