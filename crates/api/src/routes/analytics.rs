//! Dataset Analytics Routes

use axum::{
    extract::{Query, State},
    Json,
};
use churn_analytics::{
    AddonCorrelation, ChurnRate, ChurnSplit, Dataset, DatasetFilter, Driver, DriverCorrelation,
    ServiceUsage, DEFAULT_ADDON_COUNT,
};
use record_validator::attributes::ADDON_SERVICES;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, Result};
use crate::AppState;

/// Number of drivers on the drivers page
const DRIVER_COUNT: usize = 10;

/// Sidebar filters shared by the segment endpoints
///
/// List filters are comma separated, e.g. `contracts=One year,Two year`.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub contracts: Option<String>,
    pub churn: Option<String>,
    pub internet_service: Option<String>,
    pub tenure_min: Option<f64>,
    pub tenure_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ChurnRateQuery {
    #[serde(default = "default_feature")]
    pub feature: String,
}

fn default_feature() -> String {
    "Contract".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ServiceUsageQuery {
    #[serde(default = "default_group")]
    pub group: String,
    /// Comma separated service columns, all add-ons when absent
    pub services: Option<String>,
}

fn default_group() -> String {
    "SeniorCitizen".to_string()
}

fn split_list(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
}

impl FilterQuery {
    fn filter(&self) -> DatasetFilter {
        let tenure = match (self.tenure_min, self.tenure_max) {
            (None, None) => None,
            (min, max) => Some((min.unwrap_or(0.0), max.unwrap_or(f64::MAX))),
        };
        DatasetFilter {
            contracts: split_list(&self.contracts),
            churn: split_list(&self.churn),
            internet_services: split_list(&self.internet_service),
            tenure,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChurnRateResponse {
    pub feature: String,
    /// Customers left after filtering
    pub customers: usize,
    pub data: Vec<ChurnRate>,
}

#[derive(Debug, Serialize)]
pub struct TenureBandResponse {
    pub customers: usize,
    pub bands: Vec<ChurnRate>,
}

#[derive(Debug, Serialize)]
pub struct ServiceUsageResponse {
    pub group: String,
    pub customers: usize,
    pub data: Vec<ServiceUsage>,
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub feature: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub feature: String,
    pub value: String,
    #[serde(flatten)]
    pub split: ChurnSplit,
}

#[derive(Debug, Serialize)]
pub struct DriversResponse {
    pub drivers: Vec<Driver>,
    pub addons: Vec<AddonCorrelation>,
    /// Strongest encoded columns, for the correlation chart
    pub correlations: Vec<DriverCorrelation>,
}

fn dataset(state: &AppState) -> Result<&Dataset> {
    state.dataset.as_ref().ok_or(ApiError::DatasetUnavailable)
}

/// Churn rate per value of a column, after the sidebar filters
pub async fn churn_rates(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChurnRateQuery>,
    Query(filters): Query<FilterQuery>,
) -> Result<Json<ChurnRateResponse>> {
    let dataset = dataset(&state)?;
    // Validate the column even when the filters leave nothing
    dataset.column(&params.feature)?;

    let (customers, data) = match dataset.filter(&filters.filter())? {
        Some(filtered) => (filtered.len(), filtered.churn_rate_by(&params.feature)?),
        None => (0, Vec::new()),
    };

    Ok(Json(ChurnRateResponse {
        feature: params.feature,
        customers,
        data,
    }))
}

/// Churn rate per tenure band, after the sidebar filters
pub async fn tenure_bands(
    State(state): State<Arc<AppState>>,
    Query(filters): Query<FilterQuery>,
) -> Result<Json<TenureBandResponse>> {
    let (customers, bands) = match dataset(&state)?.filter(&filters.filter())? {
        Some(filtered) => (filtered.len(), filtered.churn_rate_by_tenure_band()?),
        None => (0, Vec::new()),
    };

    Ok(Json(TenureBandResponse { customers, bands }))
}

/// Share of customers using each service, per value of a grouping column
pub async fn service_usage(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ServiceUsageQuery>,
    Query(filters): Query<FilterQuery>,
) -> Result<Json<ServiceUsageResponse>> {
    let dataset = dataset(&state)?;
    dataset.column(&params.group)?;

    let requested = split_list(&params.services);
    let services: Vec<&str> = match &requested {
        Some(list) => list.iter().map(String::as_str).collect(),
        None => ADDON_SERVICES.to_vec(),
    };

    let (customers, data) = match dataset.filter(&filters.filter())? {
        Some(filtered) => (
            filtered.len(),
            filtered.service_usage_by(&params.group, &services)?,
        ),
        None => (0, Vec::new()),
    };

    Ok(Json(ServiceUsageResponse {
        group: params.group,
        customers,
        data,
    }))
}

/// Customers with `feature == value` against all others
pub async fn compare(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompareQuery>,
) -> Result<Json<CompareResponse>> {
    let split = dataset(&state)?.churn_split(&params.feature, &params.value)?;

    Ok(Json(CompareResponse {
        feature: params.feature,
        value: params.value,
        split,
    }))
}

/// Features most correlated with churn
pub async fn drivers(State(state): State<Arc<AppState>>) -> Result<Json<DriversResponse>> {
    let dataset = dataset(&state)?;

    Ok(Json(DriversResponse {
        drivers: dataset.top_drivers(DRIVER_COUNT)?,
        addons: dataset.addon_correlations(DEFAULT_ADDON_COUNT)?,
        correlations: dataset
            .correlations_with_churn()
            .into_iter()
            .take(DRIVER_COUNT)
            .collect(),
    }))
}
