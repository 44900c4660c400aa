//! Fraud Scoring Operator Console
//!
//! Lets an operator set a handful of transaction features, fills the rest
//! of the vector with zeros, and shows the score and decision returned by
//! the scoring API.

use decision_engine::{Decision, FeatureSchema, Severity};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Default prediction endpoint
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/predict";

/// Default feature-list artifact
pub const DEFAULT_FEATURES_PATH: &str = "artifacts/model_features.json";

/// Width of the rendered score bar
const BAR_WIDTH: usize = 40;

/// Client-side errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Could not connect to the API. Please ensure the backend is running. ({0})")]
    Connection(#[from] reqwest::Error),
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("API error: {0}")]
    Service(String),
}

/// An operator-adjustable feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Control {
    /// Column name in the feature list
    pub feature: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    /// Whole numbers only
    pub integer: bool,
}

pub const AMOUNT: Control = Control {
    feature: "TransactionAmt",
    label: "Transaction Amount (USD)",
    min: 0.0,
    max: 1000.0,
    default: 150.0,
    integer: false,
};

pub const HOUR: Control = Control {
    feature: "Transaction_hour",
    label: "Hour of the Day (0-23)",
    min: 0.0,
    max: 23.0,
    default: 12.0,
    integer: true,
};

pub const C1: Control = Control {
    feature: "C1",
    label: "C1 (Anonymized Count)",
    min: 0.0,
    max: 100.0,
    default: 10.0,
    integer: true,
};

pub const C13: Control = Control {
    feature: "C13",
    label: "C13 (Anonymized Count)",
    min: 0.0,
    max: 100.0,
    default: 25.0,
    integer: true,
};

impl Control {
    /// Parse and range-check a raw value
    pub fn parse(&self, raw: &str) -> Result<f64, String> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| format!("{}: '{}' is not a number", self.label, raw.trim()))?;
        if !(self.min..=self.max).contains(&value) {
            return Err(format!(
                "{}: {} is outside [{}, {}]",
                self.label, value, self.min, self.max
            ));
        }
        if self.integer && value.fract() != 0.0 {
            return Err(format!("{}: {} must be a whole number", self.label, value));
        }
        Ok(value)
    }

    /// Format a value for display
    pub fn format(&self, value: f64) -> String {
        if self.integer {
            format!("{value:.0}")
        } else {
            format!("{value:.2}")
        }
    }
}

/// Operator-controlled feature values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionInputs {
    pub amount: f64,
    pub hour: f64,
    pub c1: f64,
    pub c13: f64,
}

impl Default for TransactionInputs {
    fn default() -> Self {
        Self {
            amount: AMOUNT.default,
            hour: HOUR.default,
            c1: C1.default,
            c13: C13.default,
        }
    }
}

impl TransactionInputs {
    /// (feature name, value) pairs
    pub fn features(&self) -> [(&'static str, f64); 4] {
        [
            (AMOUNT.feature, self.amount),
            (HOUR.feature, self.hour),
            (C1.feature, self.c1),
            (C13.feature, self.c13),
        ]
    }

    /// Controls paired with the fields they edit
    pub fn controls_mut(&mut self) -> [(&'static Control, &mut f64); 4] {
        [
            (&AMOUNT, &mut self.amount),
            (&HOUR, &mut self.hour),
            (&C1, &mut self.c1),
            (&C13, &mut self.c13),
        ]
    }
}

/// Request body for the prediction endpoint
#[derive(Debug, Clone, Serialize)]
pub struct PredictPayload {
    pub features: Vec<f64>,
}

/// Build a full-width vector: controlled features by name, zeros elsewhere
pub fn build_payload(schema: &FeatureSchema, inputs: &TransactionInputs) -> PredictPayload {
    let (features, unknown) = schema.assemble(&inputs.features());
    for name in unknown {
        warn!(feature = %name, "Feature not in feature list, sent as 0");
    }
    PredictPayload { features }
}

/// Successful scoring result
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScoreOutcome {
    pub fraud_score: f64,
    pub decision: Decision,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Reply {
    Scored(ScoreOutcome),
    Failed { error: String },
}

/// HTTP client for the prediction endpoint
#[derive(Debug, Clone)]
pub struct ScoringClient {
    http: reqwest::Client,
    url: String,
}

impl ScoringClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send a feature vector and read back the score
    pub async fn score(&self, payload: &PredictPayload) -> Result<ScoreOutcome, ClientError> {
        debug!(url = %self.url, features = payload.features.len(), "Submitting transaction");
        let response = self.http.post(&self.url).json(payload).send().await?;
        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<Reply>(&text) {
            Ok(Reply::Scored(outcome)) if status.is_success() => Ok(outcome),
            Ok(Reply::Failed { error }) => Err(ClientError::Service(error)),
            _ if status.is_success() => Err(ClientError::Service(format!(
                "unexpected response body: {text}"
            ))),
            _ => Err(ClientError::Status {
                status: status.as_u16(),
                message: text,
            }),
        }
    }
}

/// Text meter for a score; clamped to [0, 1] for display only
pub fn progress_bar(score: f64, width: usize) -> String {
    let fraction = if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (fraction * width as f64).round() as usize;
    format!(
        "[{}{}] {:>5.1}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        fraction * 100.0
    )
}

/// Marker for a decision, loudest for BLOCK
pub fn severity_marker(decision: Decision) -> &'static str {
    match decision.severity() {
        Severity::Warning => "[BLOCK] ",
        Severity::Caution => "[REVIEW]",
        Severity::Success => "[OK]    ",
    }
}

/// Multi-line result block
pub fn render_outcome(outcome: &ScoreOutcome) -> String {
    format!(
        "Prediction Result\n{} Decision: {}\nFraud Score: {:.4}\n{}",
        severity_marker(outcome.decision),
        outcome.decision,
        outcome.fraud_score,
        progress_bar(outcome.fraud_score, BAR_WIDTH)
    )
}
