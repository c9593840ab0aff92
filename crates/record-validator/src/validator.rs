//! Record Validator for Domain and Range Checking

use crate::attributes::{
    AttributeKind, AttributeSpec, CustomerType, ADDON_SERVICES, INPUT_ATTRIBUTES,
    INTERNET_SERVICE, MONTHLY_CHARGES, PHONE_SERVICE, TENURE,
};
use crate::error::ValidationError;
use crate::record::{AttributeValue, CustomerProfile, RawRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Tenure valid range (months)
    pub tenure_range: (f64, f64),
    /// Monthly charges valid range ($)
    pub monthly_charges_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            tenure_range: (0.0, f64::MAX),
            monthly_charges_range: (0.0, f64::MAX),
        }
    }
}

impl ValidationConfig {
    /// Bounds of the dashboard's prediction form
    pub fn strict() -> Self {
        Self {
            tenure_range: (0.0, 72.0),
            monthly_charges_range: (18.0, 120.0),
        }
    }

    fn range_for(&self, attribute: &str) -> (f64, f64) {
        match attribute {
            TENURE => self.tenure_range,
            MONTHLY_CHARGES => self.monthly_charges_range,
            _ => (0.0, f64::MAX),
        }
    }
}

/// Validator for raw customer records
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        attribute: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { attribute });
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                attribute,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Resolve a categorical label to its canonical domain entry
    pub fn validate_category(
        &self,
        attribute: &'static str,
        value: &str,
        domain: &'static [&'static str],
    ) -> Result<&'static str, ValidationError> {
        domain
            .iter()
            .copied()
            .find(|label| *label == value)
            .ok_or_else(|| ValidationError::InvalidAttributeValue {
                attribute,
                value: value.to_string(),
                allowed: domain,
            })
    }

    /// Validate a raw record and compute its derived attributes
    ///
    /// Fails on the first unknown, missing, mistyped, out-of-domain or
    /// out-of-range attribute. Derived attributes may not be supplied.
    pub fn validate(&self, record: &RawRecord) -> Result<CustomerProfile, ValidationError> {
        if let Some(unknown) = record
            .names()
            .find(|name| !INPUT_ATTRIBUTES.iter().any(|spec| spec.name == *name))
        {
            return Err(ValidationError::UnknownAttribute(unknown.to_string()));
        }

        let mut categorical = Vec::new();
        let mut numeric = Vec::new();

        for spec in INPUT_ATTRIBUTES {
            let value = record
                .get(spec.name)
                .ok_or(ValidationError::MissingAttribute(spec.name))?;

            match (spec.kind, value) {
                (AttributeKind::Categorical(domain), AttributeValue::Text(text)) => {
                    categorical.push((spec.name, self.validate_category(spec.name, text, domain)?));
                }
                (AttributeKind::Numeric, AttributeValue::Number(number)) => {
                    self.validate_range(spec.name, *number, self.config.range_for(spec.name))?;
                    numeric.push((spec.name, *number));
                }
                (kind, _) => return Err(type_mismatch(spec, kind)),
            }
        }

        let label = |name: &str| {
            categorical
                .iter()
                .find(|(attr, _)| *attr == name)
                .map(|(_, label)| *label)
                .unwrap_or_default()
        };

        let customer_type = CustomerType::derive(label(PHONE_SERVICE), label(INTERNET_SERVICE));
        let num_internet_services = ADDON_SERVICES
            .iter()
            .filter(|addon| label(**addon) == "Yes")
            .count() as u8;

        debug!(
            "Validated record: customer_type={}, internet_services={}",
            customer_type.as_str(),
            num_internet_services
        );

        Ok(CustomerProfile::new(
            categorical,
            numeric,
            customer_type,
            num_internet_services,
        ))
    }
}

fn type_mismatch(spec: &AttributeSpec, kind: AttributeKind) -> ValidationError {
    ValidationError::TypeMismatch {
        attribute: spec.name,
        expected: match kind {
            AttributeKind::Categorical(_) => "text",
            AttributeKind::Numeric => "numeric",
        },
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
