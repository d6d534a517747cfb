//! Ordinary least squares with an intercept.
//!
//! Columns are centered and scaled to unit variance before solving, and the
//! target is centered. The intercept is recovered afterwards from the means,
//! which keeps the raw-unit columns (`year` ≈ 2000, `time_index²` in the
//! thousands) from dominating the singular spectrum. Zero-variance columns
//! receive a zero coefficient.

use nalgebra::{DMatrix, DVector};

use crate::domain::LinearModel;
use crate::math::ols::solve_least_squares;

/// Below this standard deviation a column is treated as constant.
const CONSTANT_EPS: f64 = 1e-12;

/// Fit `y ≈ intercept + x β`.
///
/// `rows` are observations, each with the same number of regressors.
/// Returns `None` for empty input, ragged rows, non-finite values, or an
/// unsolvable system.
pub fn fit_linear(rows: &[Vec<f64>], y: &[f64]) -> Option<LinearModel> {
    let n = rows.len();
    if n == 0 || n != y.len() {
        return None;
    }
    let p = rows[0].len();
    if rows.iter().any(|r| r.len() != p) {
        return None;
    }
    if rows.iter().flatten().chain(y).any(|v| !v.is_finite()) {
        return None;
    }

    let y_mean = y.iter().sum::<f64>() / n as f64;

    let mut means = vec![0.0; p];
    let mut scales = vec![0.0; p];
    for j in 0..p {
        let mean = rows.iter().map(|r| r[j]).sum::<f64>() / n as f64;
        let var = rows.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / n as f64;
        means[j] = mean;
        scales[j] = var.sqrt();
    }

    let active: Vec<usize> = (0..p).filter(|&j| scales[j] > CONSTANT_EPS).collect();
    let mut coefficients = vec![0.0; p];

    if !active.is_empty() {
        let x = DMatrix::from_fn(n, active.len(), |i, k| {
            let j = active[k];
            (rows[i][j] - means[j]) / scales[j]
        });
        let yc = DVector::from_iterator(n, y.iter().map(|v| v - y_mean));
        let beta = solve_least_squares(&x, &yc)?;
        for (k, &j) in active.iter().enumerate() {
            coefficients[j] = beta[k] / scales[j];
        }
    }

    let intercept = y_mean
        - coefficients
            .iter()
            .zip(&means)
            .map(|(b, m)| b * m)
            .sum::<f64>();

    Some(LinearModel {
        intercept,
        coefficients,
    })
}

/// Root mean squared in-sample error.
pub fn rmse(model: &LinearModel, rows: &[Vec<f64>], y: &[f64]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let sse: f64 = rows
        .iter()
        .zip(y)
        .map(|(x, v)| (v - model.predict(x)).powi(2))
        .sum();
    (sse / rows.len() as f64).sqrt()
}
