//! Fraud Decision Engine
//!
//! Maps a fraud probability to a decision tier and validates the
//! fixed-width feature vectors fed to the classifier.

mod decision;
mod error;
mod features;

pub use decision::{decide, Decision, Severity, Thresholds};
pub use error::{SchemaError, ThresholdError, ValidationError};
pub use features::{FeatureSchema, FeatureVector, FEATURE_DIMENSION};
