//! Validation Error Types

use thiserror::Error;

/// Errors raised while validating a raw customer record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Categorical value outside the attribute's fixed domain
    #[error("{attribute} value {value:?} is not one of {allowed:?}")]
    InvalidAttributeValue {
        attribute: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    /// Numeric value out of allowed range
    #[error("{attribute} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        attribute: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Numeric value is NaN or infinite
    #[error("{attribute} value must be a finite number")]
    NotFinite { attribute: &'static str },

    /// Value has the wrong type for the attribute
    #[error("{attribute} expects a {expected} value")]
    TypeMismatch {
        attribute: &'static str,
        expected: &'static str,
    },

    /// Missing required attribute
    #[error("Missing required attribute: {0}")]
    MissingAttribute(&'static str),

    /// Attribute name not accepted as input
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
}

impl ValidationError {
    /// Attribute the error refers to
    pub fn attribute(&self) -> &str {
        match self {
            ValidationError::InvalidAttributeValue { attribute, .. }
            | ValidationError::OutOfRange { attribute, .. }
            | ValidationError::NotFinite { attribute }
            | ValidationError::TypeMismatch { attribute, .. }
            | ValidationError::MissingAttribute(attribute) => attribute,
            ValidationError::UnknownAttribute(name) => name,
        }
    }
}
