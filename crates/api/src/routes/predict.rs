//! Prediction Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use decision_engine::{Decision, FeatureVector, ValidationError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

/// Request body for `POST /predict`
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Exactly 150 numeric features, in feature-list order
    pub features: Vec<f64>,
}

/// Response body for `POST /predict`
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub fraud_score: f64,
    pub decision: Decision,
}

/// Score one transaction.
///
/// The body is validated before the model is consulted, so a malformed
/// request is rejected even when the service is degraded.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| ValidationError::InvalidFormat(rejection.body_text()))?;
    let features = FeatureVector::new(request.features)?;

    let engine = state.engine.as_ref().ok_or(ApiError::ModelNotLoaded)?;
    let result = engine.score(&features)?;
    let prediction = result.prediction;

    metrics::counter!("fraud_predictions_total", "decision" => prediction.decision.as_str())
        .increment(1);
    metrics::histogram!("fraud_score").record(prediction.fraud_score);
    metrics::histogram!("fraud_inference_latency_seconds")
        .record(result.latency_us as f64 / 1_000_000.0);

    debug!(
        fraud_score = prediction.fraud_score,
        decision = %prediction.decision,
        latency_us = result.latency_us,
        "Prediction served"
    );

    Ok(Json(PredictResponse {
        fraud_score: prediction.fraud_score,
        decision: prediction.decision,
    }))
}
