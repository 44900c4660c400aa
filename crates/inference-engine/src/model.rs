//! Fraud Model Capability

use crate::linear::LogisticModel;
use crate::onnx::OnnxModel;
use crate::InferenceError;
use decision_engine::{FeatureSchema, FeatureVector};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// A pre-trained classifier that estimates the probability of fraud.
///
/// Implementations bind to the feature-name schema when they are loaded and
/// must be shareable across request handlers without locking.
pub trait FraudModel: Send + Sync {
    /// Probability of the positive ("fraud") class
    fn fraud_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError>;

    /// Number of input columns, when the artifact declares it
    fn input_width(&self) -> Option<usize> {
        None
    }

    /// Backend name for logs and health output
    fn name(&self) -> &str {
        "model"
    }
}

/// Load a model artifact, choosing the backend from the file extension.
///
/// `.onnx` files run on tract; `.json` files are logistic coefficients.
pub fn load_model<P: AsRef<Path>>(
    path: P,
    schema: &FeatureSchema,
) -> Result<Arc<dyn FraudModel>, InferenceError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(InferenceError::ArtifactMissing(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let model: Arc<dyn FraudModel> = match extension.as_deref() {
        Some("onnx") => Arc::new(OnnxModel::load(path, schema.len())?),
        Some("json") => Arc::new(LogisticModel::from_json_file(path, schema)?),
        other => {
            return Err(InferenceError::ModelLoadError(format!(
                "unsupported model format {:?} for {}",
                other.unwrap_or(""),
                path.display()
            )))
        }
    };

    info!(backend = model.name(), path = %path.display(), "Model loaded");
    Ok(model)
}
