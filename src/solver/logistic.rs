//! L2-regularized binary logistic regression fitted with Newton's method.
use super::linalg::solve;
use crate::error::Result;
use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    /// `params[0]` is the intercept, the rest follow the feature columns.
    params: DVector<f64>,
    pub iterations: usize,
    pub converged: bool,
}

#[inline]
fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Prepends a column of ones.
fn with_intercept(x: &DMatrix<f64>) -> DMatrix<f64> {
    x.clone().insert_column(0, 1.0)
}

impl LogisticRegression {
    /// Minimizes `0.5 |w|² + c · Σ logloss` with the intercept unpenalized.
    ///
    /// A singular Hessian (e.g. a single-class training set drives the
    /// intercept to infinity) stops the iteration early with the current
    /// parameters.
    pub fn fit(x: &DMatrix<f64>, y: &[f64], c: f64, max_iter: usize, tolerance: f64) -> Result<Self> {
        let design = with_intercept(x);
        let (n, p) = design.shape();
        let labels = DVector::from_column_slice(y);
        let mut params = DVector::zeros(p);
        let mut penalty = DMatrix::identity(p, p);
        penalty[(0, 0)] = 0.0;

        for iteration in 1..=max_iter {
            let probs = (&design * &params).map(sigmoid);
            let weights = probs.map(|q| q * (1.0 - q));

            let mut gradient = design.transpose() * (&probs - &labels) * c;
            gradient += &penalty * &params;

            let mut weighted = design.clone();
            for (mut row, w) in weighted.row_iter_mut().zip(weights.iter()) {
                row *= *w;
            }
            let hessian = design.transpose() * weighted * c + &penalty;

            let step = match solve(&hessian, &DMatrix::from_column_slice(p, 1, gradient.as_slice()), 1e-14) {
                Ok(step) => step.column(0).into_owned(),
                Err(_) => {
                    warn!("logistic regression stopped at iteration {}: singular Hessian", iteration);
                    return Ok(Self { params, iterations: iteration, converged: false });
                }
            };
            params -= &step;

            if step.amax() < tolerance {
                debug!("logistic regression converged after {} iterations on {} rows", iteration, n);
                return Ok(Self { params, iterations: iteration, converged: true });
            }
        }
        warn!("logistic regression did not converge in {} iterations", max_iter);
        Ok(Self { params, iterations: max_iter, converged: false })
    }

    pub fn intercept(&self) -> f64 {
        self.params[0]
    }

    pub fn coefficients(&self) -> DVector<f64> {
        self.params.rows(1, self.params.len() - 1).into_owned()
    }

    /// Probability of the positive class for every row of `x`.
    pub fn predict_proba(&self, x: &DMatrix<f64>) -> Vec<f64> {
        (with_intercept(x) * &self.params).iter().map(|&z| sigmoid(z)).collect()
    }

    /// Hard labels, 1.0 when the positive class is more likely.
    pub fn predict(&self, x: &DMatrix<f64>) -> Vec<f64> {
        self.predict_proba(x).into_iter().map(|q| if q > 0.5 { 1.0 } else { 0.0 }).collect()
    }
}

/// Share of positions where `predicted` equals `actual`.
pub fn accuracy(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return f64::NAN;
    }
    let hits = actual.iter().zip(predicted).filter(|(a, p)| a == p).count();
    hits as f64 / actual.len() as f64
}
