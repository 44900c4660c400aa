//! Scoring Engine Implementation

use crate::model::{load_model, FraudModel};
use crate::InferenceError;
use decision_engine::{Decision, FeatureSchema, FeatureVector, Thresholds, FEATURE_DIMENSION};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Fraud score and decision for one transaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Model probability of fraud, not clamped
    pub fraud_score: f64,
    /// Decision tier
    pub decision: Decision,
}

/// Result of a scoring call
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// The prediction
    pub prediction: Prediction,
    /// Inference latency in microseconds
    pub latency_us: u64,
}

/// Loaded model, feature schema, and decision thresholds.
///
/// Read-only after construction; clones share the same model.
#[derive(Clone)]
pub struct ScoringEngine {
    schema: Arc<FeatureSchema>,
    model: Arc<dyn FraudModel>,
    thresholds: Thresholds,
}

impl std::fmt::Debug for ScoringEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringEngine")
            .field("model", &self.model.name())
            .field("features", &self.schema.len())
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

impl ScoringEngine {
    /// Assemble an engine, checking the schema width once
    pub fn new(
        schema: FeatureSchema,
        model: Arc<dyn FraudModel>,
        thresholds: Thresholds,
    ) -> Result<Self, InferenceError> {
        schema.ensure_width(FEATURE_DIMENSION)?;
        if let Some(width) = model.input_width() {
            schema.ensure_width(width)?;
        }
        Ok(Self {
            schema: Arc::new(schema),
            model,
            thresholds,
        })
    }

    /// Load the feature list and model artifacts from disk
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        model_path: P,
        features_path: Q,
        thresholds: Thresholds,
    ) -> Result<Self, InferenceError> {
        let schema = FeatureSchema::from_json_file(features_path)?;
        let model = load_model(model_path, &schema)?;
        let engine = Self::new(schema, model, thresholds)?;
        info!(
            model = engine.model.name(),
            features = engine.schema.len(),
            low = thresholds.low,
            high = thresholds.high,
            "Scoring engine ready"
        );
        Ok(engine)
    }

    /// Score a validated feature vector
    pub fn score(&self, features: &FeatureVector) -> Result<InferenceResult, InferenceError> {
        let start = Instant::now();

        let fraud_score = self.model.fraud_probability(features)?;
        if !fraud_score.is_finite() {
            return Err(InferenceError::InvalidOutput(fraud_score));
        }
        let decision = self.thresholds.decide(fraud_score);

        let latency_us = start.elapsed().as_micros() as u64;
        debug!(fraud_score, %decision, latency_us, "Transaction scored");

        Ok(InferenceResult {
            prediction: Prediction {
                fraud_score,
                decision,
            },
            latency_us,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedModel {
        score: f64,
        calls: AtomicUsize,
    }

    impl FixedModel {
        fn new(score: f64) -> Self {
            Self {
                score,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl FraudModel for FixedModel {
        fn fraud_probability(&self, _features: &FeatureVector) -> Result<f64, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.score)
        }
    }

    fn schema(n: usize) -> FeatureSchema {
        FeatureSchema::from_names((0..n).map(|i| format!("V{i}")).collect()).unwrap()
    }

    fn engine(score: f64) -> ScoringEngine {
        ScoringEngine::new(
            schema(FEATURE_DIMENSION),
            Arc::new(FixedModel::new(score)),
            Thresholds::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_scenarios() {
        let cases = [
            (0.05, Decision::Approve),
            (0.35, Decision::ManualReview),
            (0.75, Decision::Block),
            (0.1, Decision::ManualReview),
        ];
        for (score, expected) in cases {
            let result = engine(score).score(&FeatureVector::zeros()).unwrap();
            assert_eq!(result.prediction.fraud_score, score);
            assert_eq!(result.prediction.decision, expected);
        }
    }

    #[test]
    fn test_model_called_once_per_score() {
        let model = Arc::new(FixedModel::new(0.2));
        let engine = ScoringEngine::new(
            schema(FEATURE_DIMENSION),
            model.clone(),
            Thresholds::default(),
        )
        .unwrap();
        engine.score(&FeatureVector::zeros()).unwrap();
        engine.score(&FeatureVector::zeros()).unwrap();
        assert_eq!(model.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_non_finite_output() {
        let err = engine(f64::NAN).score(&FeatureVector::zeros()).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidOutput(_)));
    }

    #[test]
    fn test_schema_width_checked() {
        let err = ScoringEngine::new(
            schema(149),
            Arc::new(FixedModel::new(0.5)),
            Thresholds::default(),
        )
        .unwrap_err();
        assert!(matches!(err, InferenceError::Schema(_)));
    }

    #[test]
    fn test_custom_thresholds() {
        let engine = ScoringEngine::new(
            schema(FEATURE_DIMENSION),
            Arc::new(FixedModel::new(0.35)),
            Thresholds::new(0.4, 0.9).unwrap(),
        )
        .unwrap();
        let result = engine.score(&FeatureVector::zeros()).unwrap();
        assert_eq!(result.prediction.decision, Decision::Approve);
    }

    #[test]
    fn test_load_from_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let features_path = dir.path().join("model_features.json");
        let names: Vec<String> = (0..FEATURE_DIMENSION).map(|i| format!("V{i}")).collect();
        std::fs::write(&features_path, serde_json::to_string(&names).unwrap()).unwrap();
        let model_path = dir.path().join("fraud_model.json");
        std::fs::write(
            &model_path,
            r#"{"intercept": -3.0, "coefficients": {"V0": 0.5}}"#,
        )
        .unwrap();

        let engine =
            ScoringEngine::load(&model_path, &features_path, Thresholds::default()).unwrap();
        assert_eq!(engine.model_name(), "logistic");
        let result = engine.score(&FeatureVector::zeros()).unwrap();
        assert!((0.0..=1.0).contains(&result.prediction.fraud_score));
        assert_eq!(result.prediction.decision, Decision::Approve);
    }

    #[test]
    fn test_load_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScoringEngine::load(
            dir.path().join("fraud_model.onnx"),
            dir.path().join("model_features.json"),
            Thresholds::default(),
        )
        .unwrap_err();
        assert!(err.is_missing_artifact());
    }
}
