//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use decision_engine::ValidationError;
use inference_engine::InferenceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// Message returned while the service runs without a model
pub const MODEL_NOT_LOADED: &str = "Model not loaded. Please check server logs.";

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Startup artifacts were missing; service is degraded
    #[error("{}", MODEL_NOT_LOADED)]
    ModelNotLoaded,
    /// Request body failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Model failed while scoring
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    /// Metric label for the error class
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::ModelNotLoaded => "model_not_loaded",
            ApiError::Validation(_) => "validation",
            ApiError::Inference(_) => "inference",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        metrics::counter!("fraud_prediction_errors_total", "kind" => self.kind()).increment(1);

        let body = match &self {
            ApiError::ModelNotLoaded => {
                warn!("Prediction requested while model is not loaded");
                ErrorBody {
                    error: self.to_string(),
                    kind: None,
                    field: None,
                }
            }
            ApiError::Validation(e) => {
                warn!(error = %e, "Rejected prediction request");
                ErrorBody {
                    error: e.to_string(),
                    kind: Some(self.kind().to_string()),
                    field: Some("features".to_string()),
                }
            }
            ApiError::Inference(e) => {
                error!(error = %e, "Inference failed");
                ErrorBody {
                    error: e.to_string(),
                    kind: Some(self.kind().to_string()),
                    field: None,
                }
            }
        };

        (self.status(), Json(body)).into_response()
    }
}
