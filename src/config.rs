//! Tunable knobs of the estimators.
use crate::error::{CausalError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Share of rows held out to score the propensity model.
    pub test_fraction: f64,
    /// Seed of the train/test shuffle; `None` draws from system entropy.
    pub seed: Option<u64>,
    pub logistic_max_iter: usize,
    pub logistic_tolerance: f64,
    /// Inverse regularization strength of the propensity model (larger is weaker).
    pub l2_penalty: f64,
    /// Relative pivot size below which the normal equations count as singular.
    pub singular_tolerance: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: Some(0),
            logistic_max_iter: 100,
            logistic_tolerance: 1e-8,
            l2_penalty: 1.0,
            singular_tolerance: 1e-10,
        }
    }
}

impl EstimatorConfig {
    /// Reads a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(CausalError::InvalidConfig(format!(
                "test_fraction must lie in [0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.logistic_max_iter == 0 {
            return Err(CausalError::InvalidConfig("logistic_max_iter must be positive".into()));
        }
        if !(self.l2_penalty > 0.0) {
            return Err(CausalError::InvalidConfig(format!("l2_penalty must be positive, got {}", self.l2_penalty)));
        }
        if !(self.logistic_tolerance > 0.0 && self.singular_tolerance >= 0.0) {
            return Err(CausalError::InvalidConfig("tolerances must be non-negative".into()));
        }
        Ok(())
    }
}
