//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records (`RawSalesRecord`, `NormalizedRecord`)
//! - the engineered feature table (`MonthlyAggregate`, `FeatureRow`, `FeatureTable`)
//! - fitted models and query payloads (`ProductModel`, `ForecastResponse`)

pub mod types;

pub use types::*;
