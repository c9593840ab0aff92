//! Z-score Scaling with Training-time Statistics

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};

/// Mean and standard deviation computed for a numeric column at training time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingParams {
    pub mean: f64,
    pub std: f64,
}

impl ScalingParams {
    /// Create checked scaling parameters for `column`
    pub fn new(column: &str, mean: f64, std: f64) -> Result<Self, SchemaError> {
        let params = Self { mean, std };
        params.check(column)?;
        Ok(params)
    }

    pub(crate) fn check(&self, column: &str) -> Result<(), SchemaError> {
        if self.mean.is_finite() && self.std.is_finite() && self.std > 0.0 {
            Ok(())
        } else {
            Err(SchemaError::InvalidScaling {
                column: column.to_string(),
                mean: self.mean,
                std: self.std,
            })
        }
    }

    /// Standardize a raw value
    pub fn scale(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }

    /// Map a z-score back to the raw value
    pub fn unscale(&self, z: f64) -> f64 {
        z * self.std + self.mean
    }
}
