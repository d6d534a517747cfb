//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between pipeline stages in memory
//! - exported to CSV/JSON for inspection
//! - returned to callers as JSON responses

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of regressors in a price feature row.
pub const FEATURE_COUNT: usize = 12;

/// Regressor names, in the order used for fitting and prediction.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "year",
    "month",
    "month_sin",
    "month_cos",
    "years_from_start",
    "time_index",
    "time_index_squared",
    "price_lag_1",
    "price_lag_3",
    "price_lag_12",
    "price_ma_6",
    "price_ma_12",
];

/// Lag offsets (in periods) used as regressors.
pub const LAGS: [usize; 3] = [1, 3, 12];

/// Trailing rolling-mean windows (in periods) used as regressors.
pub const ROLLING_WINDOWS: [usize; 2] = [6, 12];

/// Longest lookback any regressor needs.
pub const MAX_LOOKBACK: usize = 12;

/// Years accepted for a forecast target.
pub const MIN_FORECAST_YEAR: i32 = 1;
pub const MAX_FORECAST_YEAR: i32 = 9999;

/// One input row as read from the dataset.
///
/// The date is kept as the raw string; parsing happens in the normalizer so a
/// malformed date is reported as a load failure rather than silently skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSalesRecord {
    pub product: String,
    pub date: String,
    pub price: f64,

    pub category: Option<String>,
    pub location: Option<String>,
    pub platform: Option<String>,
    pub units_sold: Option<f64>,
    pub revenue: Option<f64>,
    pub discount: Option<f64>,
}

impl RawSalesRecord {
    pub fn new(product: impl Into<String>, date: impl Into<String>, price: f64) -> Self {
        Self {
            product: product.into(),
            date: date.into(),
            price,
            category: None,
            location: None,
            platform: None,
            units_sold: None,
            revenue: None,
            discount: None,
        }
    }
}

/// A raw record with its calendar fields resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub raw: RawSalesRecord,
    pub date: NaiveDate,
    pub year: i32,
    /// Always in `1..=12`.
    pub month: u32,
}

/// Mean price for one `(product, year, month)` key.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAggregate {
    pub product: String,
    pub year: i32,
    pub month: u32,
    pub price_avg: f64,
}

/// A fully populated training row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub product: String,
    pub year: i32,
    pub month: u32,
    pub price_avg: f64,

    pub years_from_start: i32,
    pub time_index: i32,
    pub time_index_squared: f64,
    pub month_sin: f64,
    pub month_cos: f64,

    pub price_lag_1: f64,
    pub price_lag_3: f64,
    pub price_lag_12: f64,
    pub price_ma_6: f64,
    pub price_ma_12: f64,
}

impl FeatureRow {
    /// Regressor values in [`FEATURE_NAMES`] order.
    pub fn regressors(&self) -> [f64; FEATURE_COUNT] {
        [
            self.year as f64,
            self.month as f64,
            self.month_sin,
            self.month_cos,
            self.years_from_start as f64,
            self.time_index as f64,
            self.time_index_squared,
            self.price_lag_1,
            self.price_lag_3,
            self.price_lag_12,
            self.price_ma_6,
            self.price_ma_12,
        ]
    }
}

/// Feature builder output.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    /// Earliest year across all products; reference point for `years_from_start`.
    pub min_year: i32,
    /// Rows sorted by `(product, year, month)`.
    pub rows: Vec<FeatureRow>,
    /// Number of monthly aggregate rows per product (before dropping incomplete rows).
    pub periods_per_product: Vec<(String, usize)>,
}

impl FeatureTable {
    /// Rows belonging to one product, in chronological order.
    pub fn product_rows<'a>(&'a self, product: &'a str) -> impl Iterator<Item = &'a FeatureRow> + 'a {
        self.rows.iter().filter(move |r| r.product == product)
    }
}

/// Fitted linear model: `y = intercept + Σ coefficients[j] * x[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn predict(&self, x: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(x)
                .map(|(b, v)| b * v)
                .sum::<f64>()
    }
}

/// Per-product price model with in-sample diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductModel {
    pub product: String,
    pub model: LinearModel,
    pub n_obs: usize,
    pub rmse: f64,
}

/// Last known lag/rolling values for a product, reused for every forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastContext {
    pub lag_1: f64,
    pub lag_3: f64,
    pub lag_12: f64,
    pub ma_6: f64,
    pub ma_12: f64,
}

/// JSON payload returned for a price forecast query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastResponse {
    Ok {
        product: String,
        year: i32,
        month: u32,
        predicted_price: f64,
    },
    NotFound {
        product: String,
        reason: String,
    },
}

impl ForecastResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, ForecastResponse::Ok { .. })
    }

    pub fn predicted_price(&self) -> Option<f64> {
        match self {
            ForecastResponse::Ok { predicted_price, .. } => Some(*predicted_price),
            ForecastResponse::NotFound { .. } => None,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags and environment (plus defaults).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_path: PathBuf,
    pub export_features: Option<PathBuf>,
    pub export_models: Option<PathBuf>,
    /// Fit the revenue model too (requires the revenue/category columns).
    pub train_revenue: bool,
    /// Fit the discount model too (requires the discount/units/category columns).
    pub train_discount: bool,
}

impl PipelineConfig {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            export_features: None,
            export_models: None,
            train_revenue: true,
            train_discount: true,
        }
    }
}
