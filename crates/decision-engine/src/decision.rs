//! Tiered Decision Policy

use crate::error::ThresholdError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Action taken on a scored transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// Score below the low threshold
    Approve,
    /// Score between the thresholds, inclusive
    ManualReview,
    /// Score above the high threshold
    Block,
}

/// Presentation severity of a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Success,
    Caution,
    Warning,
}

impl Decision {
    /// Wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "APPROVE",
            Decision::ManualReview => "MANUAL_REVIEW",
            Decision::Block => "BLOCK",
        }
    }

    /// How loudly the decision should be presented to an operator
    pub fn severity(&self) -> Severity {
        match self {
            Decision::Approve => Severity::Success,
            Decision::ManualReview => Severity::Caution,
            Decision::Block => Severity::Warning,
        }
    }

    /// All decision tiers
    pub fn all() -> [Decision; 3] {
        [Decision::Approve, Decision::ManualReview, Decision::Block]
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "APPROVE" => Ok(Decision::Approve),
            "MANUAL_REVIEW" => Ok(Decision::ManualReview),
            "BLOCK" => Ok(Decision::Block),
            other => Err(format!("unknown decision: {other}")),
        }
    }
}

/// Map a fraud score to a decision.
///
/// Both outer comparisons are strict, so a score equal to either threshold
/// lands in `ManualReview`. Thresholds are not validated here: with
/// `low > high` the result is whatever the two comparisons produce.
pub fn decide(fraud_score: f64, low_threshold: f64, high_threshold: f64) -> Decision {
    if fraud_score < low_threshold {
        Decision::Approve
    } else if fraud_score > high_threshold {
        Decision::Block
    } else {
        Decision::ManualReview
    }
}

/// Decision thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Scores strictly below are approved (default: 0.1)
    pub low: f64,
    /// Scores strictly above are blocked (default: 0.6)
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: 0.1,
            high: 0.6,
        }
    }
}

impl Thresholds {
    /// Create thresholds, enforcing `0 <= low <= high <= 1`
    pub fn new(low: f64, high: f64) -> Result<Self, ThresholdError> {
        Self::unchecked(low, high).validate()
    }

    /// Create thresholds without any range check
    pub fn unchecked(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Check the ordering invariant
    pub fn validate(self) -> Result<Self, ThresholdError> {
        for (name, value) in [("low", self.low), ("high", self.high)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ThresholdError::OutOfRange { name, value });
            }
        }
        if self.low > self.high {
            return Err(ThresholdError::Inverted {
                low: self.low,
                high: self.high,
            });
        }
        Ok(self)
    }

    /// Apply the policy with these thresholds
    pub fn decide(&self, fraud_score: f64) -> Decision {
        decide(fraud_score, self.low, self.high)
    }
}
