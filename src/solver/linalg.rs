//! Dense least-squares kernels on top of nalgebra.
use crate::error::{CausalError, Result};
use nalgebra::{DMatrix, DVector};

/// Solves `a * x = b`, rejecting systems whose LU pivots are numerically zero.
///
/// The system is first equilibrated with `S = diag(sqrt|a_ii|)`, solving
/// `(S⁻¹ a S⁻¹) (S x) = S⁻¹ b`, so the pivot test does not depend on the
/// units of the variables. A pivot counts as zero when it is below
/// `tolerance` times the largest pivot, which catches exactly collinear
/// columns even when rounding leaves a tiny non-zero remainder.
pub fn solve(a: &DMatrix<f64>, b: &DMatrix<f64>, tolerance: f64) -> Result<DMatrix<f64>> {
    if a.nrows() != a.ncols() || a.nrows() != b.nrows() {
        return Err(CausalError::CannotDetermineCausalEffect(format!(
            "cannot solve a {}x{} system against {} rows",
            a.nrows(),
            a.ncols(),
            b.nrows()
        )));
    }
    if a.nrows() == 0 {
        return Ok(DMatrix::zeros(0, b.ncols()));
    }

    let scale = equilibration(a);
    let scaled_a = DMatrix::from_fn(a.nrows(), a.ncols(), |r, c| a[(r, c)] / (scale[r] * scale[c]));
    let scaled_b = DMatrix::from_fn(b.nrows(), b.ncols(), |r, c| b[(r, c)] / scale[r]);

    let lu = scaled_a.lu();
    let pivots = lu.u().diagonal();
    let largest = pivots.amax();
    if !largest.is_finite() || largest == 0.0 || pivots.iter().any(|p| p.abs() <= tolerance * largest) {
        return Err(CausalError::CannotDetermineCausalEffect(
            "the normal equations are singular (collinear explanatory variables)".into(),
        ));
    }
    let solution = lu.solve(&scaled_b).ok_or_else(|| {
        CausalError::CannotDetermineCausalEffect("LU solve failed on the normal equations".into())
    })?;
    Ok(DMatrix::from_fn(solution.nrows(), solution.ncols(), |r, c| solution[(r, c)] / scale[r]))
}

/// `sqrt|a_ii|` per row; zero or non-finite diagonals keep a scale of 1.
fn equilibration(a: &DMatrix<f64>) -> DVector<f64> {
    a.diagonal().map(|d| {
        let s = d.abs().sqrt();
        if s > 0.0 && s.is_finite() { s } else { 1.0 }
    })
}

/// Least-squares coefficients from the normal equations `(XᵀX) β = Xᵀy`.
/// One column of coefficients per column of `y`.
pub fn solve_normal_equations(x: &DMatrix<f64>, y: &DMatrix<f64>, tolerance: f64) -> Result<DMatrix<f64>> {
    let xt = x.transpose();
    solve(&(&xt * x), &(&xt * y), tolerance)
}

/// Mean and sample standard deviation (n - 1 denominator) of a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub mean: f64,
    pub std: f64,
}

impl ColumnStats {
    pub fn of(values: &[f64]) -> Self {
        let n = values.len();
        if n == 0 {
            return Self { mean: f64::NAN, std: 0.0 };
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        if n < 2 {
            return Self { mean, std: 0.0 };
        }
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        Self { mean, std: (ss / (n - 1) as f64).sqrt() }
    }

    /// Zero-variance columns cannot be standardized.
    pub fn is_constant(&self) -> bool {
        self.std == 0.0
    }

    pub fn standardize(&self, values: &[f64]) -> DVector<f64> {
        DVector::from_iterator(values.len(), values.iter().map(|v| (v - self.mean) / self.std))
    }
}

/// Ordinary least squares with an intercept.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    pub intercept: f64,
    pub coefficients: DVector<f64>,
}

impl LinearRegression {
    /// Fits on centered data, then recovers the intercept from the means.
    pub fn fit(x: &DMatrix<f64>, y: &DVector<f64>, tolerance: f64) -> Result<Self> {
        let n = x.nrows();
        if n == 0 || n != y.len() {
            return Err(CausalError::CannotDetermineCausalEffect(format!(
                "regression needs matching non-empty inputs ({} rows vs {} targets)",
                n,
                y.len()
            )));
        }
        let x_mean = x.row_mean();
        let y_mean = y.mean();
        let mut centered = x.clone();
        for (mut column, mean) in centered.column_iter_mut().zip(x_mean.iter()) {
            column.add_scalar_mut(-mean);
        }
        let y_centered = DMatrix::from_iterator(n, 1, y.iter().map(|v| v - y_mean));

        let beta = solve_normal_equations(&centered, &y_centered, tolerance)?;
        let coefficients = beta.column(0).into_owned();
        let intercept = y_mean - x_mean.iter().zip(coefficients.iter()).map(|(m, b)| m * b).sum::<f64>();
        Ok(Self { intercept, coefficients })
    }

    pub fn predict(&self, x: &DMatrix<f64>) -> DVector<f64> {
        (x * &self.coefficients).add_scalar(self.intercept)
    }
}
