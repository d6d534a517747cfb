//! Mathematical utilities: SVD least squares and standardized OLS.

pub mod ols;
pub mod regression;

pub use ols::*;
pub use regression::*;
