//! Single-treatment effect estimation: naive difference, IPW and adjusted
//! linear regression.
use super::mode::InferenceMode;
use crate::config::EstimatorConfig;
use crate::error::{CausalError, Result};
use crate::graph::CausalGraph;
use crate::identification::{find_minimum_backdoor_set, NodeSet};
use crate::solver::{accuracy, train_test_split, LinearRegression, LogisticRegression};
use crate::store::Dataset;
use log::{info, warn};

/// Estimates the effect of one binary treatment column on one outcome column.
pub struct CausalInference<'a> {
    dataset: &'a Dataset,
    graph: &'a CausalGraph,
    treatment: String,
    outcome: String,
    config: EstimatorConfig,
}

/// Weighted mean `Σ yᵢ/wᵢ / Σ 1/wᵢ`, the Hajek form of an IPW mean.
fn weighted_mean(values: &[f64], probabilities: &[f64]) -> f64 {
    let weighted: f64 = values.iter().zip(probabilities).map(|(y, p)| y / p).sum();
    let weights: f64 = probabilities.iter().map(|p| 1.0 / p).sum();
    weighted / weights
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

impl<'a> CausalInference<'a> {
    /// Checks that both columns exist in the dataset and the graph.
    pub fn new(dataset: &'a Dataset, graph: &'a CausalGraph, treatment: &str, outcome: &str) -> Result<Self> {
        for name in [treatment, outcome] {
            dataset.column(name)?;
            graph.node_id(name)?;
        }
        if treatment == outcome {
            return Err(CausalError::InvalidNodeSet(format!(
                "'{}' cannot be both treatment and outcome",
                treatment
            )));
        }
        Ok(Self {
            dataset,
            graph,
            treatment: treatment.to_string(),
            outcome: outcome.to_string(),
            config: EstimatorConfig::default(),
        })
    }

    pub fn with_config(mut self, config: EstimatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EstimatorConfig { &self.config }
    pub fn treatment(&self) -> &str { &self.treatment }
    pub fn outcome(&self) -> &str { &self.outcome }

    /// Minimum back-door set for the treatment/outcome pair, with its cost.
    pub fn identify(&self) -> Result<(f64, NodeSet)> {
        let x = NodeSet::from([self.treatment.clone()]);
        let y = NodeSet::from([self.outcome.clone()]);
        find_minimum_backdoor_set(self.graph, &x, &y)
    }

    pub fn adjustment_set(&self) -> Result<Vec<String>> {
        Ok(self.identify()?.1.into_iter().collect())
    }

    /// Outcome values split into (treated, untreated) rows.
    fn split_by_treatment(&self, values: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let treatment = self.dataset.column(&self.treatment)?;
        let treated = values.iter().zip(treatment).filter(|(_, t)| **t == 1.0).map(|(v, _)| *v).collect();
        let untreated = values.iter().zip(treatment).filter(|(_, t)| **t == 0.0).map(|(v, _)| *v).collect();
        Ok((treated, untreated))
    }

    pub fn naive_treatment_effect(&self) -> Result<f64> {
        let (treated, untreated) = self.split_by_treatment(self.dataset.column(&self.outcome)?)?;
        Ok(mean(&treated) - mean(&untreated))
    }

    /// Probability of treatment for every row.
    ///
    /// Without an adjustment set the score is the treatment indicator itself.
    /// Otherwise a logistic model is trained on a shuffled split, scored on
    /// the held-out rows for the log, and evaluated on the full dataset.
    pub fn propensity_scores(&self) -> Result<Vec<f64>> {
        let adjustment = self.adjustment_set()?;
        let treatment = self.dataset.column(&self.treatment)?;
        if adjustment.is_empty() {
            return Ok(treatment.to_vec());
        }

        let features = self.dataset.matrix(&adjustment)?;
        let split = train_test_split(self.dataset.n_rows(), self.config.test_fraction, self.config.seed);
        let labels = |rows: &[usize]| rows.iter().map(|&r| treatment[r]).collect::<Vec<f64>>();

        let model = LogisticRegression::fit(
            &features.select_rows(split.train.iter()),
            &labels(&split.train),
            self.config.l2_penalty,
            self.config.logistic_max_iter,
            self.config.logistic_tolerance,
        )?;
        if split.test.is_empty() {
            info!("propensity model trained on all {} rows; no held-out rows to score", split.train.len());
        } else {
            let predicted = model.predict(&features.select_rows(split.test.iter()));
            info!(
                "propensity model accuracy={:.4} on {} held-out rows (adjusting for {:?})",
                accuracy(&labels(&split.test), &predicted),
                split.test.len(),
                adjustment
            );
        }
        Ok(model.predict_proba(&features))
    }

    /// Inverse-probability-weighted average treatment effect.
    pub fn average_treatment_effect(&self) -> Result<f64> {
        let scores = self.propensity_scores()?;
        self.average_treatment_effect_with_scores(&scores)
    }

    /// IPW average treatment effect for caller-supplied propensity scores.
    ///
    /// Scores of exactly 0 (treated) or 1 (untreated) divide by zero; the
    /// resulting infinity or NaN is returned as is.
    pub fn average_treatment_effect_with_scores(&self, scores: &[f64]) -> Result<f64> {
        if scores.len() != self.dataset.n_rows() {
            return Err(CausalError::DatasetShape {
                column: "propensity".into(),
                expected: self.dataset.n_rows(),
                actual: scores.len(),
            });
        }
        let outcome = self.dataset.column(&self.outcome)?;
        let (treated_y, untreated_y) = self.split_by_treatment(outcome)?;
        let (treated_p, untreated_p) = self.split_by_treatment(scores)?;
        let untreated_q: Vec<f64> = untreated_p.iter().map(|p| 1.0 - p).collect();

        if treated_p.contains(&0.0) || untreated_q.contains(&0.0) {
            warn!("degenerate propensity score of 0 or 1; the IPW estimate is not finite");
        }
        Ok(weighted_mean(&treated_y, &treated_p) - weighted_mean(&untreated_y, &untreated_q))
    }

    /// Coefficient of the treatment in an OLS fit of the outcome on the
    /// adjustment set plus the treatment.
    pub fn linear_causal_effect(&self) -> Result<f64> {
        let mut explain = self.adjustment_set()?;
        explain.push(self.treatment.clone());
        let x = self.dataset.matrix(&explain)?;
        let y = nalgebra::DVector::from_column_slice(self.dataset.column(&self.outcome)?);
        let fit = LinearRegression::fit(&x, &y, self.config.singular_tolerance)?;
        Ok(fit.coefficients[explain.len() - 1])
    }

    pub fn causal_effect(&self, mode: InferenceMode) -> Result<f64> {
        let effect = match mode {
            InferenceMode::NaiveTreatmentEffect => self.naive_treatment_effect()?,
            InferenceMode::AverageTreatmentEffect => self.average_treatment_effect()?,
            InferenceMode::LinearRegressionEffect => self.linear_causal_effect()?,
        };
        info!("{} of '{}' on '{}' = {}", mode, self.treatment, self.outcome, effect);
        Ok(effect)
    }
}
