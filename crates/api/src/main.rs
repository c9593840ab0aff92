//! Churn Prediction Server - Main Entry Point

use api::config::ServerConfig;
use api::{init_logging, run_server};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;
    init_logging(&config.logging)?;

    info!("=== Churn Prediction Server v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Model artifact: {}", config.artifact_path.display());
    match &config.dataset_path {
        Some(path) => info!("Customer dataset: {}", path.display()),
        None => info!("No customer dataset configured, analytics disabled"),
    }

    run_server(config).await
}
