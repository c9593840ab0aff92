//! Cleaned Customer Dataset

use crate::AnalyticsError;
use csv::{ReaderBuilder, Trim};
use record_validator::attributes::INTERNET_SERVICE;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Target column, `Yes` for customers who churned
pub const CHURN_COLUMN: &str = "Churn";

/// Values of a single column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Every non-empty cell parsed as a number, empty cells are NaN
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    fn from_cells(name: String, cells: Vec<String>) -> Self {
        let numeric = cells.iter().any(|c| !c.is_empty())
            && cells.iter().all(|c| c.is_empty() || c.parse::<f64>().is_ok());

        let data = if numeric {
            ColumnData::Numeric(
                cells
                    .iter()
                    .map(|c| c.parse::<f64>().unwrap_or(f64::NAN))
                    .collect(),
            )
        } else {
            ColumnData::Categorical(cells)
        };
        Self { name, data }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    /// Display label of the value in `row`
    pub fn label(&self, row: usize) -> String {
        match &self.data {
            ColumnData::Numeric(values) => format!("{}", values[row]),
            ColumnData::Categorical(values) => values[row].clone(),
        }
    }

    fn select(&self, rows: &[usize]) -> Self {
        let data = match &self.data {
            ColumnData::Numeric(values) => {
                ColumnData::Numeric(rows.iter().map(|&i| values[i]).collect())
            }
            ColumnData::Categorical(values) => {
                ColumnData::Categorical(rows.iter().map(|&i| values[i].clone()).collect())
            }
        };
        Self {
            name: self.name.clone(),
            data,
        }
    }
}

/// Sidebar filters of the exploration pages
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DatasetFilter {
    /// Contract types to keep, all when `None`
    pub contracts: Option<Vec<String>>,
    /// Churn labels (`Yes`/`No`) to keep, all when `None`
    pub churn: Option<Vec<String>>,
    /// InternetService values to keep, all when `None`
    pub internet_services: Option<Vec<String>>,
    /// Inclusive tenure range in months
    pub tenure: Option<(f64, f64)>,
}

/// Column-oriented customer table with a parsed churn target
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    churned: Vec<bool>,
}

impl Dataset {
    /// Load a CSV file with a header row
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalyticsError> {
        let path = path.as_ref();
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(path)?;
        let dataset = Self::from_csv(reader)?;
        info!(
            "Loaded dataset {} ({} rows, {} columns)",
            path.display(),
            dataset.len(),
            dataset.columns.len()
        );
        Ok(dataset)
    }

    /// Load CSV text from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AnalyticsError> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, AnalyticsError> {
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_matches('\u{feff}').to_string())
            .collect();

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record?;
            for (column, value) in cells.iter_mut().zip(record.iter()) {
                column.push(value.to_string());
            }
        }

        let columns: Vec<Column> = headers
            .into_iter()
            .zip(cells)
            .map(|(name, cells)| Column::from_cells(name, cells))
            .collect();

        Self::from_columns(columns)
    }

    /// Build from already parsed columns of equal length
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, AnalyticsError> {
        let churn = columns
            .iter()
            .find(|c| c.name == CHURN_COLUMN)
            .ok_or_else(|| AnalyticsError::MissingColumn(CHURN_COLUMN.to_string()))?;

        let churned = match &churn.data {
            ColumnData::Categorical(values) => values
                .iter()
                .enumerate()
                .map(|(row, value)| match value.as_str() {
                    "Yes" => Ok(true),
                    "No" => Ok(false),
                    other => Err(AnalyticsError::InvalidChurnValue {
                        row,
                        value: other.to_string(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?,
            ColumnData::Numeric(values) => values
                .iter()
                .enumerate()
                .map(|(row, value)| {
                    if *value == 1.0 {
                        Ok(true)
                    } else if *value == 0.0 {
                        Ok(false)
                    } else {
                        Err(AnalyticsError::InvalidChurnValue {
                            row,
                            value: value.to_string(),
                        })
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        if churned.is_empty() {
            return Err(AnalyticsError::Empty);
        }

        debug!("Dataset has {} rows, {} churned", churned.len(), churned.iter().filter(|c| **c).count());
        Ok(Self { columns, churned })
    }

    /// Number of customers
    pub fn len(&self) -> usize {
        self.churned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.churned.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Result<&Column, AnalyticsError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| AnalyticsError::MissingColumn(name.to_string()))
    }

    /// Categorical values of a column
    pub fn categorical(&self, name: &str) -> Result<&[String], AnalyticsError> {
        match &self.column(name)?.data {
            ColumnData::Categorical(values) => Ok(values),
            ColumnData::Numeric(_) => Err(AnalyticsError::NotCategorical(name.to_string())),
        }
    }

    /// Churn flag per row
    pub fn churned(&self) -> &[bool] {
        &self.churned
    }

    /// Overall share of churned customers
    pub fn churn_rate(&self) -> f64 {
        self.churned.iter().filter(|c| **c).count() as f64 / self.len() as f64
    }

    /// Rows for which `keep` is true, `None` when no row matches
    pub fn select(&self, keep: impl Fn(usize) -> bool) -> Option<Self> {
        let rows: Vec<usize> = (0..self.len()).filter(|&row| keep(row)).collect();
        if rows.is_empty() {
            return None;
        }
        Some(Self {
            columns: self.columns.iter().map(|c| c.select(&rows)).collect(),
            churned: rows.iter().map(|&i| self.churned[i]).collect(),
        })
    }

    /// Apply the sidebar filters
    ///
    /// Returns `Ok(None)` when no customer passes.
    pub fn filter(&self, filter: &DatasetFilter) -> Result<Option<Self>, AnalyticsError> {
        let contracts = match &filter.contracts {
            Some(allowed) => Some((self.categorical("Contract")?, allowed)),
            None => None,
        };
        let internet = match &filter.internet_services {
            Some(allowed) => Some((self.categorical(INTERNET_SERVICE)?, allowed)),
            None => None,
        };
        let tenure = match filter.tenure {
            Some(range) => Some((self.numeric("tenure")?, range)),
            None => None,
        };

        Ok(self.select(|row| {
            let contract_ok = contracts
                .map(|(values, allowed)| allowed.contains(&values[row]))
                .unwrap_or(true);
            let churn_ok = filter
                .churn
                .as_ref()
                .map(|allowed| {
                    let label = if self.churned[row] { "Yes" } else { "No" };
                    allowed.iter().any(|a| a == label)
                })
                .unwrap_or(true);
            let internet_ok = internet
                .map(|(values, allowed)| allowed.contains(&values[row]))
                .unwrap_or(true);
            let tenure_ok = tenure
                .map(|(values, (min, max))| values[row] >= min && values[row] <= max)
                .unwrap_or(true);
            contract_ok && churn_ok && internet_ok && tenure_ok
        }))
    }

    /// Numeric values of a column
    pub fn numeric(&self, name: &str) -> Result<&[f64], AnalyticsError> {
        match &self.column(name)?.data {
            ColumnData::Numeric(values) => Ok(values),
            ColumnData::Categorical(_) => Err(AnalyticsError::MissingColumn(format!(
                "{} (numeric)",
                name
            ))),
        }
    }
}
