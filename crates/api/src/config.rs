//! Server Configuration
//!
//! Values are layered: built-in defaults, then `churn.toml` (or the file
//! named by `CHURN_CONFIG`), then `CHURN__*` environment variables, e.g.
//! `CHURN__LOGGING__LEVEL=debug`.

use config::{Config, ConfigError, Environment, File};
use record_validator::ValidationConfig;
use risk_alerting::RiskConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_VAR: &str = "CHURN_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "churn.toml";

/// Prefix of `CHURN__<SECTION>__<KEY>` overrides
const ENV_PREFIX: &str = "CHURN";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Training artifact (JSON)
    pub artifact_path: PathBuf,
    /// Cleaned customer CSV for the analytics endpoints
    pub dataset_path: Option<PathBuf>,
    /// Ranked contributions returned per prediction
    pub top_k_contributions: usize,
    pub logging: LoggingConfig,
    pub validation: ValidationConfig,
    pub risk: RiskConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            artifact_path: PathBuf::from("artifacts/churn_model.json"),
            dataset_path: None,
            top_k_contributions: inference_engine::DEFAULT_TOP_K,
            logging: LoggingConfig::default(),
            validation: ValidationConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from the default file location and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// Load from `path` (optional) and the environment
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: &str, prefix: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}
