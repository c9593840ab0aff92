//! Feature Schema
//!
//! The ordered model input columns fixed at training time, together with the
//! scaling parameters of the numeric columns and the categorical levels that
//! encode as all zeros.

use crate::error::SchemaError;
use crate::normalizer::ScalingParams;
use record_validator::attributes;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Ordered model input columns and their encoding metadata
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    scaling: BTreeMap<String, ScalingParams>,
    /// Categorical attribute -> domain labels without a column
    zero_encoded: BTreeMap<&'static str, Vec<&'static str>>,
}

impl FeatureSchema {
    /// Build a schema from training-time column order and scaling statistics
    ///
    /// Every numeric attribute the encoder writes must appear among the
    /// columns and have valid scaling parameters.
    pub fn new(
        columns: Vec<String>,
        scaling: BTreeMap<String, ScalingParams>,
    ) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            if index.insert(column.clone(), position).is_some() {
                return Err(SchemaError::DuplicateColumn(column.clone()));
            }
        }

        for numeric in attributes::numeric_attributes() {
            if !index.contains_key(numeric) {
                return Err(SchemaError::MissingColumn(numeric.to_string()));
            }
            scaling
                .get(numeric)
                .ok_or_else(|| SchemaError::MissingScaling(numeric.to_string()))?
                .check(numeric)?;
        }

        let zero_encoded = attributes::categorical_attributes()
            .map(|(attribute, domain)| {
                let missing = domain
                    .iter()
                    .copied()
                    .filter(|label| !index.contains_key(&one_hot_column(attribute, label)))
                    .collect::<Vec<_>>();
                if missing.len() > 1 {
                    warn!(
                        "{} has {} levels without a column, all encode as zero: {:?}",
                        attribute,
                        missing.len(),
                        missing
                    );
                }
                (attribute, missing)
            })
            .collect();

        for column in &columns {
            if !is_recognized_column(column) {
                warn!("Schema column {:?} is not produced by any input attribute", column);
            }
        }

        debug!("Feature schema built with {} columns", columns.len());

        Ok(Self {
            columns,
            index,
            scaling,
            zero_encoded,
        })
    }

    /// Check baselines declared by the training artifact
    ///
    /// A declared baseline must be a valid level of a categorical attribute
    /// and must not have a column of its own.
    pub fn with_baselines(self, declared: &BTreeMap<String, String>) -> Result<Self, SchemaError> {
        for (attribute, value) in declared {
            let domain = attributes::categorical_attributes()
                .find(|(name, _)| name == attribute)
                .map(|(_, domain)| domain)
                .ok_or_else(|| SchemaError::UnknownBaselineAttribute(attribute.clone()))?;

            if !domain.contains(&value.as_str()) {
                return Err(SchemaError::InvalidBaseline {
                    attribute: attribute.clone(),
                    value: value.clone(),
                });
            }
            if self.position(&one_hot_column(attribute, value)).is_some() {
                return Err(SchemaError::BaselineHasColumn {
                    attribute: attribute.clone(),
                    value: value.clone(),
                });
            }
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in model order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Name of the column at `position`
    pub fn column(&self, position: usize) -> Option<&str> {
        self.columns.get(position).map(String::as_str)
    }

    /// Position of a column
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Scaling parameters of a numeric column
    pub fn scaling(&self, column: &str) -> Option<&ScalingParams> {
        self.scaling.get(column)
    }

    /// Levels of a categorical attribute that encode as all zeros
    pub(crate) fn zero_encoded(&self, attribute: &str) -> &[&'static str] {
        self.zero_encoded
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The dropped reference level, when exactly one level lacks a column
    pub fn baseline(&self, attribute: &str) -> Option<&'static str> {
        match self.zero_encoded(attribute) {
            [single] => Some(*single),
            _ => None,
        }
    }

    /// Reference level of every categorical attribute that has one
    pub fn baselines(&self) -> BTreeMap<&'static str, &'static str> {
        self.zero_encoded
            .keys()
            .filter_map(|attribute| Some((*attribute, self.baseline(attribute)?)))
            .collect()
    }
}

/// One-hot column name for an attribute level
pub fn one_hot_column(attribute: &str, label: &str) -> String {
    format!("{attribute}_{label}")
}

fn is_recognized_column(column: &str) -> bool {
    attributes::numeric_attributes().any(|name| name == column)
        || attributes::categorical_attributes().any(|(attribute, domain)| {
            column
                .strip_prefix(attribute)
                .and_then(|rest| rest.strip_prefix('_'))
                .is_some_and(|label| domain.contains(&label))
        })
}
