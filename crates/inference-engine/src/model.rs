//! Logistic Regression Classifier

use crate::PredictionError;
use feature_engine::{EncodedVector, SchemaError};

/// Trained binary logistic-regression model, immutable once built
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    weights: Vec<f64>,
    intercept: f64,
}

impl LogisticModel {
    /// Create a model from trained coefficients
    pub fn new(weights: Vec<f64>, intercept: f64) -> Result<Self, PredictionError> {
        if weights.is_empty() {
            return Err(PredictionError::ModelUnavailable(
                "model has no coefficients".to_string(),
            ));
        }
        if let Some(position) = weights.iter().position(|w| !w.is_finite()) {
            return Err(PredictionError::ModelUnavailable(format!(
                "coefficient {} is not finite",
                position
            )));
        }
        if !intercept.is_finite() {
            return Err(PredictionError::ModelUnavailable(
                "intercept is not finite".to_string(),
            ));
        }
        Ok(Self { weights, intercept })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Linear score `w·x + b`
    pub fn decision_function(&self, features: &EncodedVector) -> Result<f64, PredictionError> {
        if features.len() != self.weights.len() {
            return Err(SchemaError::LengthMismatch {
                expected: self.weights.len(),
                actual: features.len(),
            }
            .into());
        }
        let dot: f64 = self
            .weights
            .iter()
            .zip(features.values())
            .map(|(w, x)| w * x)
            .sum();
        Ok(dot + self.intercept)
    }

    /// Probability of the churn class
    pub fn predict_proba(&self, features: &EncodedVector) -> Result<f64, PredictionError> {
        self.decision_function(features).map(sigmoid)
    }

    /// Churn class, 1 when the probability exceeds 0.5
    pub fn predict(&self, features: &EncodedVector) -> Result<u8, PredictionError> {
        self.decision_function(features).map(|z| u8::from(z > 0.0))
    }
}

/// Logistic function, stable for large |z|
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
