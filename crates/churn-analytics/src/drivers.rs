//! Correlation Drivers of Churn

use crate::dataset::{ColumnData, Dataset, CHURN_COLUMN};
use crate::AnalyticsError;
use feature_engine::{pearson_correlation, SummaryStatistics};
use record_validator::attributes::{ADDON_SERVICES, INTERNET_SERVICE};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Categorical columns with more distinct levels than this are not encoded
const MAX_LEVELS: usize = 50;

/// Number of add-on correlations reported by default
pub const DEFAULT_ADDON_COUNT: usize = 5;

/// One column of the one-hot encoded dataset
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedColumn {
    /// `<source>_<level>` for indicators, the source name otherwise
    pub name: String,
    /// Dataset column this was derived from
    pub source: String,
    /// Indicator level, `None` for numeric pass-through
    pub level: Option<String>,
    pub values: Vec<f64>,
}

/// Absolute correlation of an encoded column with churn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverCorrelation {
    pub column: String,
    pub source: String,
    pub level: Option<String>,
    /// |Pearson r| against `Churn_Yes`
    pub correlation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriverSummary {
    Numeric { mean: f64, std_dev: f64 },
    Categorical { most_frequent: String, count: usize },
}

/// A source feature among the strongest churn correlates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Driver {
    pub feature: String,
    /// Encoded column that ranked the feature
    pub column: String,
    pub correlation: f64,
    pub summary: DriverSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddonCorrelation {
    pub addon: String,
    /// |Pearson r| of `<addon>_Yes` with churn among internet customers
    pub correlation: f64,
}

impl Dataset {
    /// One-hot encode categorical columns over their sorted levels
    ///
    /// Numeric columns pass through. Identifier-like columns (every value
    /// distinct, or more than 50 levels) are left out.
    pub fn one_hot(&self, drop_first: bool) -> Vec<EncodedColumn> {
        let mut encoded = Vec::new();
        for column in self.columns() {
            match &column.data {
                ColumnData::Numeric(values) => encoded.push(EncodedColumn {
                    name: column.name.clone(),
                    source: column.name.clone(),
                    level: None,
                    values: values.clone(),
                }),
                ColumnData::Categorical(values) => {
                    let levels: BTreeSet<&str> = values.iter().map(String::as_str).collect();
                    if levels.len() > MAX_LEVELS || (levels.len() == values.len() && values.len() > 1)
                    {
                        debug!("Skipping identifier-like column {}", column.name);
                        continue;
                    }
                    let skip = usize::from(drop_first);
                    for level in levels.into_iter().skip(skip) {
                        encoded.push(EncodedColumn {
                            name: format!("{}_{}", column.name, level),
                            source: column.name.clone(),
                            level: Some(level.to_string()),
                            values: values
                                .iter()
                                .map(|v| if v == level { 1.0 } else { 0.0 })
                                .collect(),
                        });
                    }
                }
            }
        }
        encoded
    }

    /// Absolute correlation of every encoded column with churn, strongest first
    ///
    /// Zero-variance columns are skipped. Rows with a missing numeric value
    /// are dropped pairwise.
    pub fn correlations_with_churn(&self) -> Vec<DriverCorrelation> {
        let target: Vec<f64> = self.churned().iter().map(|c| f64::from(u8::from(*c))).collect();

        let mut correlations: Vec<DriverCorrelation> = self
            .one_hot(true)
            .into_iter()
            .filter(|column| column.source != CHURN_COLUMN)
            .filter_map(|column| {
                let (x, y): (Vec<f64>, Vec<f64>) = column
                    .values
                    .iter()
                    .zip(&target)
                    .filter(|(x, _)| x.is_finite())
                    .map(|(x, y)| (*x, *y))
                    .unzip();
                let r = pearson_correlation(&x, &y)?;
                Some(DriverCorrelation {
                    column: column.name,
                    source: column.source,
                    level: column.level,
                    correlation: r.abs(),
                })
            })
            .collect();

        correlations.sort_by(|a, b| b.correlation.total_cmp(&a.correlation));
        correlations
    }

    /// The `n` source features with the strongest churn correlation
    ///
    /// Each feature is ranked by its best encoded column.
    pub fn top_drivers(&self, n: usize) -> Result<Vec<Driver>, AnalyticsError> {
        let mut seen = BTreeSet::new();
        let mut drivers = Vec::with_capacity(n);

        for correlation in self.correlations_with_churn() {
            if drivers.len() == n {
                break;
            }
            if !seen.insert(correlation.source.clone()) {
                continue;
            }
            let summary = self.summarize(&correlation.source)?;
            drivers.push(Driver {
                feature: correlation.source,
                column: correlation.column,
                correlation: correlation.correlation,
                summary,
            });
        }
        Ok(drivers)
    }

    fn summarize(&self, name: &str) -> Result<DriverSummary, AnalyticsError> {
        match &self.column(name)?.data {
            ColumnData::Numeric(values) => {
                let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
                let stats = SummaryStatistics::compute(&finite);
                Ok(DriverSummary::Numeric {
                    mean: stats.mean,
                    std_dev: stats.std_dev,
                })
            }
            ColumnData::Categorical(values) => {
                let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
                for value in values {
                    *counts.entry(value.as_str()).or_default() += 1;
                }
                // Strictly greater keeps the lexicographically first on ties
                let mut best: Option<(&str, usize)> = None;
                for (value, count) in counts {
                    if best.map_or(true, |(_, top)| count > top) {
                        best = Some((value, count));
                    }
                }
                let (most_frequent, count) = best.ok_or(AnalyticsError::Empty)?;
                Ok(DriverSummary::Categorical {
                    most_frequent: most_frequent.to_string(),
                    count,
                })
            }
        }
    }

    /// Correlation of each add-on service with churn among internet customers
    pub fn addon_correlations(&self, n: usize) -> Result<Vec<AddonCorrelation>, AnalyticsError> {
        let internet = self.categorical(INTERNET_SERVICE)?;
        let Some(subset) = self.select(|row| internet[row] != "No") else {
            return Ok(Vec::new());
        };

        let target: Vec<f64> = subset
            .churned()
            .iter()
            .map(|c| f64::from(u8::from(*c)))
            .collect();

        let mut correlations = Vec::with_capacity(ADDON_SERVICES.len());
        for addon in ADDON_SERVICES {
            let indicator: Vec<f64> = subset
                .categorical(addon)?
                .iter()
                .map(|v| if v == "Yes" { 1.0 } else { 0.0 })
                .collect();
            if let Some(r) = pearson_correlation(&indicator, &target) {
                correlations.push(AddonCorrelation {
                    addon: addon.to_string(),
                    correlation: r.abs(),
                });
            }
        }

        correlations.sort_by(|a, b| b.correlation.total_cmp(&a.correlation));
        correlations.truncate(n);
        Ok(correlations)
    }
}
