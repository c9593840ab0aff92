//! Risk Tier Classification

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Risk tier thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Probabilities strictly above this are HIGH (default: 0.7)
    pub high_threshold: f64,
    /// Probabilities strictly above this are MEDIUM (default: 0.4)
    pub medium_threshold: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_threshold: 0.7,
            medium_threshold: 0.4,
        }
    }
}

/// Churn risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    High,
    Medium,
    Low,
}

impl RiskTier {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::High => "HIGH",
            RiskTier::Medium => "MEDIUM",
            RiskTier::Low => "LOW",
        }
    }

    /// Get recommended retention actions
    pub fn recommended_actions(&self) -> &'static [&'static str] {
        match self {
            RiskTier::High => &[
                "Immediate retention campaign",
                "Personal outreach call",
                "Special discount offer",
            ],
            RiskTier::Medium => &[
                "Targeted email campaign",
                "Loyalty program enrollment",
                "Service satisfaction survey",
            ],
            RiskTier::Low => &[
                "Maintain current service level",
                "Upselling opportunities",
                "VIP program consideration",
            ],
        }
    }
}

/// Tier, headline and actions for one prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    /// e.g. "HIGH RISK: 74.7% chance of churn"
    pub headline: String,
    pub recommended_actions: Vec<&'static str>,
}

/// Classifies churn probabilities into risk tiers
#[derive(Debug, Clone, Default)]
pub struct RiskClassifier {
    config: RiskConfig,
}

impl RiskClassifier {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Get tier for a churn probability, both thresholds exclusive
    pub fn classify(&self, probability: f64) -> RiskTier {
        if probability > self.config.high_threshold {
            RiskTier::High
        } else if probability > self.config.medium_threshold {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    /// Tier plus the text shown next to the gauge
    pub fn assess(&self, probability: f64) -> RiskAssessment {
        let tier = self.classify(probability);
        debug!("Risk tier {} for probability {:.4}", tier.as_str(), probability);
        RiskAssessment {
            tier,
            headline: format!(
                "{} RISK: {:.1}% chance of churn",
                tier.as_str(),
                probability * 100.0
            ),
            recommended_actions: tier.recommended_actions().to_vec(),
        }
    }
}
