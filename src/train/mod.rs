//! Model training and inference.
//!
//! Responsibilities:
//!
//! - fit one OLS price model per product (parallel, order-independent)
//! - derive each product's forecast context from its feature history
//! - assemble forecast rows and apply the fitted model

pub mod forecast;
pub mod trainer;

pub use forecast::*;
pub use trainer::*;
