//! Feature engineering: date normalization, lookback windows, and the monthly
//! per-product feature table.

pub mod builder;
pub mod normalize;
pub mod window;

pub use builder::*;
pub use normalize::*;
pub use window::*;
