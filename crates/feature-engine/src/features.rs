//! Feature Vector Encoding

use crate::error::SchemaError;
use crate::schema::{one_hot_column, FeatureSchema};
use record_validator::attributes;
use record_validator::CustomerProfile;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Model input vector, position `i` holds the value of schema column `i`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedVector {
    values: Vec<f64>,
}

impl EncodedVector {
    /// All-zero vector for a schema of `len` columns
    pub fn zeros(len: usize) -> Self {
        Self {
            values: vec![0.0; len],
        }
    }

    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named column
    pub fn get(&self, schema: &FeatureSchema, column: &str) -> Option<f64> {
        schema.position(column).and_then(|i| self.values.get(i).copied())
    }

    /// (column, value) pairs in schema order
    pub fn named<'a>(&'a self, schema: &'a FeatureSchema) -> impl Iterator<Item = (&'a str, f64)> {
        schema
            .columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Encodes validated customer profiles against a fixed feature schema
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    schema: FeatureSchema,
}

impl FeatureEncoder {
    /// Create an encoder for a schema
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Encode a profile into a vector in schema column order
    ///
    /// Numeric attributes are z-scored with the schema's scaling parameters.
    /// Categorical attributes set their `<Attribute>_<Label>` column to 1 when
    /// the schema has one; otherwise the label is a zero-encoded level and
    /// all of that attribute's columns stay 0.
    pub fn encode(&self, profile: &CustomerProfile) -> Result<EncodedVector, SchemaError> {
        if self.schema.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut vector = EncodedVector::zeros(self.schema.len());

        for (attribute, value) in profile.numeric_values() {
            let params = self
                .schema
                .scaling(attribute)
                .ok_or_else(|| SchemaError::MissingScaling(attribute.to_string()))?;
            let position = self
                .schema
                .position(attribute)
                .ok_or_else(|| SchemaError::MissingColumn(attribute.to_string()))?;
            vector.values[position] = params.scale(*value);
        }

        for (attribute, domain) in attributes::categorical_attributes() {
            if let Some(label) = profile.categorical(attribute) {
                if let Some(position) = self.one_hot(attribute, label, domain) {
                    vector.values[position] = 1.0;
                }
            }
        }

        debug!(
            "Encoded profile into {} features ({} non-zero)",
            vector.len(),
            vector.values.iter().filter(|v| **v != 0.0).count()
        );

        Ok(vector)
    }

    /// Column to set for one categorical level, `None` for a zero-encoded level
    fn one_hot(&self, attribute: &str, label: &str, domain: &[&str]) -> Option<usize> {
        debug_assert!(domain.contains(&label), "{attribute}={label} outside domain");
        self.schema.position(&one_hot_column(attribute, label))
    }
}
