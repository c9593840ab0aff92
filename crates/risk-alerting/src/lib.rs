//! Churn Risk Alerting
//!
//! Maps churn probabilities to risk tiers and the retention actions shown
//! alongside a prediction.

mod tier;

pub use tier::{RiskAssessment, RiskClassifier, RiskConfig, RiskTier};
