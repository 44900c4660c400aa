//! ONNX classifier backend (tract)

use crate::model::FraudModel;
use crate::InferenceError;
use decision_engine::FeatureVector;
use std::path::Path;
use tracing::{debug, info};
use tract_onnx::prelude::*;

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// Fraud classifier exported to ONNX.
///
/// Scikit-learn style exports must be produced without the ZipMap post
/// processor so that class probabilities come out as a plain `f32 [1, k]`
/// tensor.
pub struct OnnxModel {
    plan: OnnxPlan,
    width: usize,
}

impl OnnxModel {
    /// Load and optimize the model for a single `[1, width]` row
    pub fn load<P: AsRef<Path>>(path: P, width: usize) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!(path = %path.display(), width, "Loading ONNX model");

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, width]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {e}", path.display())))?;

        Ok(Self { plan, width })
    }

    /// Pull the positive-class probability out of the model outputs
    fn positive_class(outputs: &[TValue]) -> Result<f64, InferenceError> {
        for output in outputs {
            if output.datum_type() != f32::datum_type() {
                continue;
            }
            let shape = output.shape();
            let single_row = shape.len() <= 2 && shape.iter().rev().skip(1).all(|&d| d == 1);
            if !single_row {
                continue;
            }
            let values = output
                .as_slice::<f32>()
                .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
            let probability = match values.len() {
                0 => continue,
                1 => values[0],
                _ => values[1],
            };
            return Ok(probability as f64);
        }
        Err(InferenceError::InferenceFailed(
            "model produced no f32 probability output".to_string(),
        ))
    }
}

impl FraudModel for OnnxModel {
    fn fraud_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        if features.len() != self.width {
            return Err(InferenceError::InvalidInputShape {
                expected: self.width,
                actual: features.len(),
            });
        }

        let input = Tensor::from_shape(&[1, self.width], &features.to_f32())
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let probability = Self::positive_class(&outputs)?;
        debug!(probability, "ONNX inference complete");
        Ok(probability)
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.width)
    }

    fn name(&self) -> &str {
        "onnx"
    }
}
