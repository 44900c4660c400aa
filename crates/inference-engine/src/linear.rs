//! Logistic regression backend

use crate::model::FraudModel;
use crate::InferenceError;
use decision_engine::{FeatureSchema, FeatureVector};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// On-disk form: coefficients keyed by feature name
#[derive(Debug, Deserialize)]
struct LogisticArtifact {
    intercept: f64,
    coefficients: BTreeMap<String, f64>,
}

/// Logistic regression over named features.
///
/// Coefficient names are resolved to vector positions once at load time.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    intercept: f64,
    /// (position, weight) pairs
    weights: Vec<(usize, f64)>,
    width: usize,
}

impl LogisticModel {
    /// Build from an intercept and named coefficients
    pub fn new(
        intercept: f64,
        coefficients: impl IntoIterator<Item = (String, f64)>,
        schema: &FeatureSchema,
    ) -> Result<Self, InferenceError> {
        let weights = coefficients
            .into_iter()
            .map(|(name, weight)| {
                schema.position(&name).map(|p| (p, weight)).ok_or_else(|| {
                    InferenceError::ModelLoadError(format!(
                        "coefficient for unknown feature {name}"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if !intercept.is_finite() || weights.iter().any(|(_, w)| !w.is_finite()) {
            return Err(InferenceError::ModelLoadError(
                "logistic model contains non-finite parameters".to_string(),
            ));
        }

        Ok(Self {
            intercept,
            weights,
            width: schema.len(),
        })
    }

    /// Load a JSON artifact
    pub fn from_json_file<P: AsRef<Path>>(
        path: P,
        schema: &FeatureSchema,
    ) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {e}", path.display())))?;
        let artifact: LogisticArtifact = serde_json::from_str(&json)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {e}", path.display())))?;
        Self::new(artifact.intercept, artifact.coefficients, schema)
    }

    fn logit(&self, values: &[f64]) -> f64 {
        self.weights
            .iter()
            .fold(self.intercept, |acc, &(position, weight)| {
                acc + weight * values[position]
            })
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl FraudModel for LogisticModel {
    fn fraud_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        if features.len() != self.width {
            return Err(InferenceError::InvalidInputShape {
                expected: self.width,
                actual: features.len(),
            });
        }
        Ok(sigmoid(self.logit(features.values())))
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.width)
    }

    fn name(&self) -> &str {
        "logistic"
    }
}
