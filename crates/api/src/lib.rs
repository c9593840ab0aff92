//! Churn Prediction API Server
//!
//! REST API serving churn predictions, model details and dataset analytics
//! for the retention dashboard.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use churn_analytics::Dataset;
use inference_engine::{InferenceEngine, PipelineOptions};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use risk_alerting::RiskClassifier;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, Level};

pub mod config;
pub mod error;
mod routes;

use config::{LoggingConfig, ServerConfig};
use error::ApiError;

/// Application state shared across handlers
pub struct AppState {
    /// Prediction pipeline, loaded once at startup
    pub engine: InferenceEngine,
    /// Customer dataset, `None` when not configured or unreadable
    pub dataset: Option<Dataset>,
    pub risk: RiskClassifier,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    /// Prometheus exposition, `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create application state from configuration
    pub fn new(config: &ServerConfig) -> Self {
        let options = PipelineOptions {
            validation: config.validation.clone(),
            top_k: config.top_k_contributions,
        };
        let engine = InferenceEngine::load(&config.artifact_path, options);

        let dataset = config.dataset_path.as_ref().and_then(|path| {
            Dataset::from_path(path)
                .map_err(|e| error!("Dataset {} unavailable: {}", path.display(), e))
                .ok()
        });

        Self::with_parts(engine, dataset, RiskClassifier::new(config.risk.clone()))
    }

    /// Assemble state from already loaded parts
    pub fn with_parts(
        engine: InferenceEngine,
        dataset: Option<Dataset>,
        risk: RiskClassifier,
    ) -> Self {
        Self {
            engine,
            dataset,
            risk,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the metrics endpoint
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_loaded: bool,
    pub model_version: Option<String>,
    pub dataset_rows: Option<usize>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/predict", post(routes::predictions::predict))
        .route("/api/v1/model", get(routes::model::get_model))
        .route("/api/v1/analytics/churn-rates", get(routes::analytics::churn_rates))
        .route("/api/v1/analytics/tenure-bands", get(routes::analytics::tenure_bands))
        .route("/api/v1/analytics/service-usage", get(routes::analytics::service_usage))
        .route("/api/v1/analytics/compare", get(routes::analytics::compare))
        .route("/api/v1/analytics/drivers", get(routes::analytics::drivers))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let pipeline = state.engine.pipeline().ok();

    Json(HealthResponse {
        status: if pipeline.is_some() { "healthy" } else { "degraded" }.to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model_loaded: pipeline.is_some(),
        model_version: pipeline.map(|p| p.version().to_string()),
        dataset_rows: state.dataset.as_ref().map(Dataset::len),
    })
}

/// Prometheus text exposition
async fn metrics_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = state.metrics.as_ref().ok_or(ApiError::MetricsUnavailable)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid log level: {}", config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}

/// Run the server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    let state = Arc::new(AppState::new(&config).with_metrics(handle));
    let app = create_router(state);

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use inference_engine::PipelineOptions;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const ARTIFACT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../artifacts/churn_model.json");

    const CUSTOMERS: &str = "customerID,SeniorCitizen,tenure,Contract,InternetService,OnlineSecurity,OnlineBackup,DeviceProtection,TechSupport,StreamingTV,StreamingMovies,MonthlyCharges,NumInternetServices,Churn
C1,No,1,Month-to-month,Fiber optic,No,No,No,No,Yes,No,85.5,1,Yes
C2,No,34,One year,DSL,Yes,No,Yes,No,No,No,56.95,2,No
C3,Yes,2,Month-to-month,Fiber optic,No,No,No,No,No,No,70.7,0,Yes
C4,No,45,Two year,DSL,Yes,Yes,Yes,Yes,No,No,42.3,4,No
C5,No,30,Month-to-month,DSL,No,Yes,No,No,No,No,50.1,1,No
C6,Yes,60,Two year,No,No internet service,No internet service,No internet service,No internet service,No internet service,No internet service,20.0,0,No
";

    fn state(with_dataset: bool) -> Arc<AppState> {
        let engine = InferenceEngine::load(ARTIFACT, PipelineOptions::default());
        let dataset = with_dataset.then(|| Dataset::from_reader(CUSTOMERS.as_bytes()).unwrap());
        Arc::new(AppState::with_parts(engine, dataset, RiskClassifier::default()))
    }

    fn record() -> Value {
        json!({
            "Partner": "No",
            "Dependents": "No",
            "tenure": 1,
            "Contract": "Month-to-month",
            "MonthlyCharges": 95.0,
            "PaymentMethod": "Electronic check",
            "PhoneService": "Yes",
            "InternetService": "Fiber optic",
            "PaperlessBilling": "Yes",
            "StreamingTV": "No",
            "StreamingMovies": "No",
            "TechSupport": "No",
            "MultipleLines": "No",
            "OnlineSecurity": "No",
            "OnlineBackup": "No",
            "DeviceProtection": "No"
        })
    }

    async fn send(state: Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
        let response = create_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, body) = send(state(true), get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model_loaded"], true);
        assert_eq!(body["model_version"], "2025.10-logreg-c1");
        assert_eq!(body["dataset_rows"], 6);
    }

    #[tokio::test]
    async fn test_predict_high_risk_customer() {
        let (status, body) = send(state(false), post_json("/api/v1/predict", &record())).await;
        assert_eq!(status, StatusCode::OK);

        let p = body["churn_probability"].as_f64().unwrap();
        assert!(p > 0.7, "p = {}", p);
        assert_eq!(body["churn_class"], 1);
        assert_eq!(body["risk"]["tier"], "HIGH");
        assert_eq!(body["risk"]["recommended_actions"][0], "Immediate retention campaign");
        assert_eq!(body["profile_summary"]["customer_type"], "Both");
        assert_eq!(body["profile_summary"]["num_internet_services"], 0);
        assert!(body["contributions"].as_array().unwrap().len() <= 10);
    }

    #[tokio::test]
    async fn test_predict_invalid_attribute() {
        let mut record = record();
        record["Contract"] = json!("Weekly");
        let (status, body) = send(state(false), post_json("/api/v1/predict", &record)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "invalid_attribute");
    }

    #[tokio::test]
    async fn test_predict_non_text_values() {
        for value in [Value::Null, json!(true), json!(["Yes"])] {
            let mut record = record();
            record["Partner"] = value.clone();
            let (status, body) = send(state(false), post_json("/api/v1/predict", &record)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "value {}", value);
            assert_eq!(body["error"], "invalid_attribute");
            assert!(body["message"].is_string());
        }
    }

    #[tokio::test]
    async fn test_predict_malformed_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"tenure\": "))
            .unwrap();
        let (status, body) = send(state(false), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "malformed_body");
    }

    #[tokio::test]
    async fn test_predict_without_model() {
        let engine = InferenceEngine::load("/nonexistent/model.json", PipelineOptions::default());
        let state = Arc::new(AppState::with_parts(engine, None, RiskClassifier::default()));

        let (status, body) = send(state.clone(), post_json("/api/v1/predict", &record())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "model_unavailable");

        let (status, body) = send(state, get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
    }

    #[tokio::test]
    async fn test_model_endpoint() {
        let (status, body) = send(state(false), get("/api/v1/model")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["feature_count"], 30);
        let importance = body["importance"].as_array().unwrap();
        assert_eq!(importance.len(), 10);
        assert_eq!(importance[0]["feature"], "Contract_Two year");

        assert_eq!(body["baselines"]["Contract"], "Month-to-month");
        assert_eq!(body["baselines"]["InternetService"], "DSL");
        assert_eq!(body["metrics"]["accuracy"], 0.817);
        assert_eq!(body["metrics"]["recall"], 0.537);
    }

    #[tokio::test]
    async fn test_churn_rates_with_filters() {
        let (status, body) = send(
            state(true),
            get("/api/v1/analytics/churn-rates?feature=InternetService&contracts=Month-to-month&tenure_max=12"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["customers"], 2);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["value"], "Fiber optic");
        assert_eq!(data[0]["churn_rate"], 1.0);
    }

    #[tokio::test]
    async fn test_churn_rates_internet_customers_only() {
        let (status, body) = send(
            state(true),
            get("/api/v1/analytics/churn-rates?feature=NumInternetServices&internet_service=DSL,Fiber%20optic"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["customers"], 5);
        let values: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|rate| rate["value"].as_str().unwrap())
            .collect();
        assert_eq!(values, vec!["0", "1", "2", "4"]);
        assert_eq!(body["data"][0]["churn_rate"], 1.0);
        assert_eq!(body["data"][1]["churn_rate"], 0.5);
    }

    #[tokio::test]
    async fn test_tenure_bands_endpoint() {
        let (status, body) = send(state(true), get("/api/v1/analytics/tenure-bands")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["customers"], 6);
        let bands = body["bands"].as_array().unwrap();
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[0]["value"], "0-12");
        assert_eq!(bands[0]["churn_rate"], 1.0);
        assert_eq!(bands[1]["value"], "25-48");
        assert_eq!(bands[1]["customers"], 3);

        let (_, body) = send(
            state(true),
            get("/api/v1/analytics/tenure-bands?contracts=Two%20year"),
        )
        .await;
        assert_eq!(body["customers"], 2);
        assert_eq!(body["bands"][0]["value"], "25-48");
    }

    #[tokio::test]
    async fn test_service_usage_by_senior_status() {
        let (status, body) = send(
            state(true),
            get("/api/v1/analytics/service-usage?group=SeniorCitizen"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["group"], "SeniorCitizen");
        assert_eq!(body["customers"], 6);

        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["group"], "No");
        assert_eq!(data[0]["customers"], 4);
        assert_eq!(data[0]["usage"].as_array().unwrap().len(), 6);
        assert_eq!(data[0]["usage"][0], json!(["OnlineSecurity", 0.5]));
        assert_eq!(data[1]["group"], "Yes");
        assert_eq!(data[1]["usage"][0], json!(["OnlineSecurity", 0.0]));

        let (_, body) = send(
            state(true),
            get("/api/v1/analytics/service-usage?services=TechSupport,StreamingTV&churn=No"),
        )
        .await;
        assert_eq!(body["customers"], 4);
        assert_eq!(body["data"][0]["usage"], json!([["TechSupport", 1.0 / 3.0], ["StreamingTV", 0.0]]));
    }

    #[tokio::test]
    async fn test_service_usage_unknown_service() {
        let (status, body) = send(
            state(true),
            get("/api/v1/analytics/service-usage?services=Gender"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_column");
    }

    #[tokio::test]
    async fn test_churn_rates_empty_selection() {
        let (status, body) = send(
            state(true),
            get("/api/v1/analytics/churn-rates?tenure_min=100"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["customers"], 0);
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_churn_rates_unknown_feature() {
        let (status, body) = send(state(true), get("/api/v1/analytics/churn-rates?feature=Gender")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_column");
    }

    #[tokio::test]
    async fn test_compare_endpoint() {
        let (status, body) = send(
            state(true),
            get("/api/v1/analytics/compare?feature=Contract&value=Month-to-month"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selected"]["churned"], 2);
        assert_eq!(body["selected"]["retained"], 1);
        assert_eq!(body["others"]["retained"], 3);
    }

    #[tokio::test]
    async fn test_drivers_endpoint() {
        let (status, body) = send(state(true), get("/api/v1/analytics/drivers")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["drivers"].as_array().unwrap().is_empty());
        assert!(body["addons"].as_array().unwrap().len() <= 5);

        let correlations: Vec<f64> = body["correlations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["correlation"].as_f64().unwrap())
            .collect();
        assert!(!correlations.is_empty() && correlations.len() <= 10);
        assert!(correlations.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[tokio::test]
    async fn test_analytics_without_dataset() {
        let (status, body) = send(state(false), get("/api/v1/analytics/drivers")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "dataset_unavailable");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (status, _) = send(state(false), get("/metrics")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let handle = PrometheusBuilder::new().build_recorder().handle();
        let engine = InferenceEngine::load(ARTIFACT, PipelineOptions::default());
        let state = Arc::new(
            AppState::with_parts(engine, None, RiskClassifier::default()).with_metrics(handle),
        );
        let response = create_router(state).oneshot(get("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
