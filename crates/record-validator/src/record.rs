//! Raw and Validated Customer Records

use crate::attributes::{CustomerType, CUSTOMER_TYPE, NUM_INTERNET_SERVICES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value submitted for a single attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// Attribute name to value mapping as received from the UI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(BTreeMap<String, AttributeValue>);

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<AttributeValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A record whose values all passed validation, with derived attributes filled in
///
/// Categorical values point into the attribute table's domains, so every
/// label here is one the encoder knows about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerProfile {
    /// (attribute, label) in table order, `CustomerType` last
    categorical: Vec<(&'static str, &'static str)>,
    /// (attribute, value) in table order, `NumInternetServices` last
    numeric: Vec<(&'static str, f64)>,
    customer_type: CustomerType,
    num_internet_services: u8,
}

impl CustomerProfile {
    pub(crate) fn new(
        mut categorical: Vec<(&'static str, &'static str)>,
        mut numeric: Vec<(&'static str, f64)>,
        customer_type: CustomerType,
        num_internet_services: u8,
    ) -> Self {
        categorical.push((CUSTOMER_TYPE, customer_type.as_str()));
        numeric.push((NUM_INTERNET_SERVICES, f64::from(num_internet_services)));
        Self {
            categorical,
            numeric,
            customer_type,
            num_internet_services,
        }
    }

    /// Label of a categorical attribute
    pub fn categorical(&self, name: &str) -> Option<&'static str> {
        self.categorical
            .iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, label)| *label)
    }

    /// Value of a numeric attribute
    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.numeric
            .iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, value)| *value)
    }

    pub fn categorical_values(&self) -> &[(&'static str, &'static str)] {
        &self.categorical
    }

    pub fn numeric_values(&self) -> &[(&'static str, f64)] {
        &self.numeric
    }

    pub fn customer_type(&self) -> CustomerType {
        self.customer_type
    }

    pub fn num_internet_services(&self) -> u8 {
        self.num_internet_services
    }
}
