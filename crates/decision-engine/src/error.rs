//! Decision Engine Error Types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating a feature vector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Vector does not have the expected number of features
    #[error("expected exactly {expected} features, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// NaN or infinite feature value
    #[error("feature at index {index} is not a finite number ({value})")]
    NonFinite { index: usize, value: f64 },

    /// Finite value too large to pass to the model as `f32`
    #[error("feature at index {index} is outside the f32 range ({value})")]
    OutOfRange { index: usize, value: f64 },

    /// Payload could not be read as a list of numbers
    #[error("invalid feature payload: {0}")]
    InvalidFormat(String),
}

/// Errors raised while loading or checking the feature-name list
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Artifact file does not exist
    #[error("feature list not found at {}", .0.display())]
    NotFound(PathBuf),

    /// Artifact exists but could not be read
    #[error("failed to read feature list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact is not a JSON array of strings
    #[error("failed to parse feature list: {0}")]
    Parse(#[from] serde_json::Error),

    /// Same feature name listed twice
    #[error("duplicate feature name: {0}")]
    DuplicateName(String),

    /// Feature list length disagrees with the model input width
    #[error("feature list has {actual} names but the model expects {expected}")]
    WidthMismatch { expected: usize, actual: usize },
}

/// Errors raised when thresholds violate `0 <= low <= high <= 1`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("{name} threshold {value} is outside [0, 1]")]
    OutOfRange { name: &'static str, value: f64 },

    #[error("low threshold {low} is greater than high threshold {high}")]
    Inverted { low: f64, high: f64 },
}
