//! Health Routes

use axum::{extract::State, Json};
use decision_engine::Thresholds;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

/// Greeting returned by `GET /`
pub const WELCOME_MESSAGE: &str = "Welcome to the Fraud Detection API";

/// Fixed liveness payload
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub message: String,
}

/// Detailed health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelStatus,
}

/// Scoring engine status
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub backend: Option<String>,
    pub feature_count: usize,
    pub thresholds: Option<Thresholds>,
}

/// Liveness check
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".to_string(),
        message: WELCOME_MESSAGE.to_string(),
    })
}

/// Health check with model status
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let model = match &state.engine {
        Some(engine) => ModelStatus {
            loaded: true,
            backend: Some(engine.model_name().to_string()),
            feature_count: engine.schema().len(),
            thresholds: Some(engine.thresholds()),
        },
        None => ModelStatus {
            loaded: false,
            backend: None,
            feature_count: 0,
            thresholds: None,
        },
    };

    Json(HealthResponse {
        status: if model.loaded { "healthy" } else { "degraded" }.to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model,
    })
}
