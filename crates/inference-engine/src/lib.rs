//! Fraud Model Inference Engine
//!
//! Loads the pre-trained fraud classifier and turns validated feature
//! vectors into a fraud score and decision. ONNX models run on tract-onnx.

mod engine;
mod linear;
mod model;
mod onnx;

pub use engine::{InferenceResult, Prediction, ScoringEngine};
pub use linear::LogisticModel;
pub use model::{load_model, FraudModel};
pub use onnx::OnnxModel;

use decision_engine::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors during model loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model artifact not found at {}", .0.display())]
    ArtifactMissing(PathBuf),
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Feature list error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Model returned a non-finite probability: {0}")]
    InvalidOutput(f64),
}

impl InferenceError {
    /// Whether the error comes from a missing startup artifact
    pub fn is_missing_artifact(&self) -> bool {
        matches!(
            self,
            InferenceError::ArtifactMissing(_) | InferenceError::Schema(SchemaError::NotFound(_))
        )
    }
}
