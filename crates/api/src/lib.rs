//! Fraud Scoring API Server
//!
//! REST API that scores e-commerce transactions with a pre-trained fraud
//! classifier and returns an APPROVE / MANUAL_REVIEW / BLOCK decision.

use axum::{
    routing::{get, post},
    Router,
};
use inference_engine::ScoringEngine;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod routes;

pub use crate::config::{LogFormat, LoggingConfig, ServiceConfig};
pub use crate::error::{ApiError, ErrorBody};

/// Application state shared across handlers.
///
/// Built once at startup and never mutated, so handlers share it through
/// an `Arc` without locking.
pub struct AppState {
    /// Scoring engine; `None` while degraded
    pub engine: Option<ScoringEngine>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    /// Prometheus handle when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state around an optional scoring engine
    pub fn new(engine: Option<ScoringEngine>) -> Self {
        Self {
            engine,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    /// State with no model: every prediction is refused
    pub fn degraded() -> Self {
        Self::new(None)
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Load artifacts named in the config.
    ///
    /// Missing or unusable artifacts are logged and leave the service
    /// degraded instead of failing startup.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let engine = match ScoringEngine::load(
            &config.artifacts.model_path,
            &config.artifacts.features_path,
            config.thresholds,
        ) {
            Ok(engine) => Some(engine),
            Err(e) if e.is_missing_artifact() => {
                error!(
                    error = %e,
                    model_path = %config.artifacts.model_path.display(),
                    features_path = %config.artifacts.features_path.display(),
                    "Required model or feature file not found, serving in degraded mode"
                );
                None
            }
            Err(e) => {
                error!(error = %e, "Failed to load scoring engine, serving in degraded mode");
                None
            }
        };
        Self::new(engine)
    }

    pub fn is_degraded(&self) -> bool {
        self.engine.is_none()
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health))
        .route("/predict", post(routes::predict::predict))
        .route("/metrics", get(routes::metrics::render))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Initialize logging
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let parsed = config.level.parse::<Level>().ok();
    let builder = FmtSubscriber::builder()
        .with_max_level(parsed.unwrap_or(Level::INFO))
        .with_target(true);

    match config.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.finish())?,
    }
    if parsed.is_none() {
        warn!(level = %config.level, "Unknown log level, falling back to info");
    }
    Ok(())
}

/// Resolve when the process receives Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the server
pub async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    let mut state = AppState::from_config(&config);
    if config.metrics.enabled {
        state = state.with_metrics(PrometheusBuilder::new().install_recorder()?);
    }
    if state.is_degraded() {
        warn!("Prediction endpoint will return errors until artifacts are provided");
    }

    let mut app = create_router(Arc::new(state));
    if config.rate_limit.enabled {
        let governor = rate_limit::create_governor_config(&config.rate_limit).ok_or_else(|| {
            anyhow::anyhow!("rate_limit.per_second and burst_size must be non-zero")
        })?;
        info!(
            per_second = config.rate_limit.per_second,
            burst_size = config.rate_limit.burst_size,
            "Rate limiting enabled"
        );
        app = app.layer(GovernorLayer { config: governor });
    }

    info!("Starting API server on {}", config.server.addr);

    let listener = tokio::net::TcpListener::bind(&config.server.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
