//! Fraud Scoring API - Main Entry Point

use api::{init_logging, run_server, ServiceConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load()?;
    init_logging(&config.logging)?;

    info!("=== Fraud Scoring API v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        low = config.thresholds.low,
        high = config.thresholds.high,
        "Decision thresholds"
    );

    run_server(config).await
}
