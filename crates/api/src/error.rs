//! API Error Responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use churn_analytics::AnalyticsError;
use inference_engine::PredictionError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    /// Request body is not a JSON object of text and number values
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error("No customer dataset is loaded")]
    DatasetUnavailable,

    #[error("Metrics recorder is not installed")]
    MetricsUnavailable,
}

impl ApiError {
    /// Status code and machine-readable kind of the error
    pub(crate) fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Prediction(e) => {
                let status = match e {
                    PredictionError::InvalidAttribute(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    PredictionError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    PredictionError::SchemaMismatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.kind())
            }
            // Well-formed JSON whose values have the wrong type is an attribute error
            ApiError::InvalidBody(rejection) => {
                let status = rejection.status();
                if status == StatusCode::UNPROCESSABLE_ENTITY {
                    (status, "invalid_attribute")
                } else {
                    (status, "malformed_body")
                }
            }
            ApiError::Analytics(AnalyticsError::MissingColumn(_))
            | ApiError::Analytics(AnalyticsError::NotCategorical(_)) => {
                (StatusCode::BAD_REQUEST, "invalid_column")
            }
            ApiError::Analytics(_) => (StatusCode::INTERNAL_SERVER_ERROR, "analytics"),
            ApiError::DatasetUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "dataset_unavailable"),
            ApiError::MetricsUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "metrics_unavailable"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        if status.is_server_error() {
            tracing::error!(kind, detail = %self, "Request failed");
        }

        let body = Json(json!({
            "error": kind,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use record_validator::ValidationError;

    #[test]
    fn test_status_codes() {
        let invalid = ApiError::from(PredictionError::InvalidAttribute(
            ValidationError::MissingAttribute("tenure"),
        ));
        assert_eq!(invalid.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        let unavailable = ApiError::from(PredictionError::ModelUnavailable("gone".to_string()));
        assert_eq!(unavailable.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let column = ApiError::from(AnalyticsError::MissingColumn("Gender".to_string()));
        assert_eq!(column.into_response().status(), StatusCode::BAD_REQUEST);

        assert_eq!(
            ApiError::DatasetUnavailable.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
