//! Feature Vector and Feature-Name Schema

use crate::error::{SchemaError, ValidationError};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Number of features the classifier consumes
pub const FEATURE_DIMENSION: usize = 150;

/// Validated model input: exactly [`FEATURE_DIMENSION`] finite values, each
/// representable as `f32`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Validate raw values
    pub fn new(values: Vec<f64>) -> Result<Self, ValidationError> {
        if values.len() != FEATURE_DIMENSION {
            return Err(ValidationError::WrongLength {
                expected: FEATURE_DIMENSION,
                actual: values.len(),
            });
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ValidationError::NonFinite { index, value });
        }
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| v.abs() > f32::MAX as f64)
        {
            return Err(ValidationError::OutOfRange { index, value });
        }
        Ok(Self(values))
    }

    /// All-zero vector
    pub fn zeros() -> Self {
        Self(vec![0.0; FEATURE_DIMENSION])
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values as `f32`, the dtype most exported classifiers take.
    ///
    /// Never produces an infinity: `new` rejects anything wider than `f32`.
    pub fn to_f32(&self) -> Vec<f32> {
        self.0.iter().map(|&v| v as f32).collect()
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = ValidationError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

/// Ordered feature names giving each vector position its meaning.
///
/// Loaded once at startup and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Build a schema from names, rejecting duplicates
    pub fn from_names(names: Vec<String>) -> Result<Self, SchemaError> {
        let mut index = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(SchemaError::DuplicateName(name.clone()));
            }
        }
        Ok(Self { names, index })
    }

    /// Parse a JSON array of strings
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let names: Vec<String> = serde_json::from_str(json)?;
        Self::from_names(names)
    }

    /// Load the feature-list artifact
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SchemaError::NotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let schema = Self::from_json_str(&json)?;
        info!(path = %path.display(), features = schema.len(), "Feature list loaded");
        Ok(schema)
    }

    /// Check the schema against a model input width
    pub fn ensure_width(&self, expected: usize) -> Result<(), SchemaError> {
        if self.names.len() != expected {
            return Err(SchemaError::WidthMismatch {
                expected,
                actual: self.names.len(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of a named feature
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Zero-filled vector of schema length with the named values set.
    ///
    /// Returns the vector and the names that are not part of the schema.
    pub fn assemble(&self, values: &[(&str, f64)]) -> (Vec<f64>, Vec<String>) {
        let mut vector = vec![0.0; self.names.len()];
        let mut unknown = Vec::new();
        for &(name, value) in values {
            match self.position(name) {
                Some(position) => vector[position] = value,
                None => {
                    debug!(feature = name, "Feature not in schema, left at default");
                    unknown.push(name.to_string());
                }
            }
        }
        (vector, unknown)
    }
}
