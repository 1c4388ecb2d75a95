//! The single-treatment estimation strategies.
use crate::error::CausalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InferenceMode {
    /// Difference of outcome means between treated and untreated rows.
    NaiveTreatmentEffect,
    /// Inverse-probability-weighted average treatment effect.
    AverageTreatmentEffect,
    /// Treatment coefficient of the adjusted linear regression.
    LinearRegressionEffect,
}

impl InferenceMode {
    pub const ALL: [InferenceMode; 3] = [
        InferenceMode::NaiveTreatmentEffect,
        InferenceMode::AverageTreatmentEffect,
        InferenceMode::LinearRegressionEffect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InferenceMode::NaiveTreatmentEffect => "NaiveTreatmentEffect",
            InferenceMode::AverageTreatmentEffect => "AverageTreatmentEffect",
            InferenceMode::LinearRegressionEffect => "LinearRegressionEffect",
        }
    }
}

impl fmt::Display for InferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InferenceMode {
    type Err = CausalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| CausalError::InvalidInferenceMode(s.to_string()))
    }
}
