//! Least squares solver.
//!
//! The engineered regressors are heavily collinear: `year` and
//! `years_from_start` differ by a constant, `time_index` and the lag/rolling
//! columns move together on trending series, and a short history can leave
//! fewer rows than columns. We therefore solve by SVD and zero out singular
//! values below a cutoff *relative to the largest one*. This yields the
//! minimum-norm solution for rank-deficient and wide systems alike.
//!
//! Prices arrive as decimal text, so columns that are exact multiples of each
//! other in theory differ by rounding noise in practice. Those noise
//! directions have singular values around `1e-8` relative; inverting them
//! turns a well-behaved fit into one with huge offsetting coefficients that
//! explode as soon as a query leaves the training rows. The cutoff sits above
//! that noise floor.
//! (Nalgebra's `QR::solve` is intended for square systems and will panic for
//! non-square matrices.)

use nalgebra::{DMatrix, DVector};

/// Singular values below `RANK_TOLERANCE * s_max` are treated as zero.
pub const RANK_TOLERANCE: f64 = 1e-6;

/// Solve `min ||x β - y||²` using SVD.
///
/// Returns `None` if the solve fails or produces non-finite values.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() != y.len() {
        return None;
    }
    if x.ncols() == 0 {
        return Some(DVector::zeros(0));
    }

    let svd = x.clone().svd(true, true);
    let s_max = svd.singular_values.max();
    if !s_max.is_finite() {
        return None;
    }
    if s_max == 0.0 {
        return Some(DVector::zeros(x.ncols()));
    }

    let beta = svd.solve(y, RANK_TOLERANCE * s_max).ok()?;
    beta.iter().all(|v| v.is_finite()).then_some(beta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn duplicate_columns_share_the_weight() {
        // Two identical columns: minimum-norm solution splits the slope evenly.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let y = DVector::from_row_slice(&[2.0, 4.0, 6.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 1.0).abs() < 1e-9);
        assert!((beta[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rounding_noise_between_twin_columns_is_not_inverted() {
        // Second column is the first plus alternating noise of 1e-8.
        let x = DMatrix::from_fn(10, 2, |i, j| {
            let base = i as f64;
            if j == 0 { base } else { base + if i % 2 == 0 { 1e-8 } else { -1e-8 } }
        });
        let y = DVector::from_fn(10, |i, _| 2.0 * i as f64);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 1.0).abs() < 1e-6, "beta = {beta}");
        assert!((beta[1] - 1.0).abs() < 1e-6, "beta = {beta}");
    }

    #[test]
    fn wide_system_is_solved() {
        let x = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 2.0]);
        let y = DVector::from_row_slice(&[9.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        let fitted = (&x * &beta)[0];
        assert!((fitted - 9.0).abs() < 1e-9);
    }

    #[test]
    fn zero_matrix_gives_zero_solution() {
        let x = DMatrix::zeros(4, 2);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0, 4.0]);
        let beta = solve_least_squares(&x, &y).unwrap();
        assert_eq!(beta.len(), 2);
        assert!(beta.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let x = DMatrix::zeros(3, 2);
        let y = DVector::zeros(2);
        assert!(solve_least_squares(&x, &y).is_none());
    }
}
