//! Single-step price inference.
//!
//! A forecast row combines:
//! - calendar regressors computed from the requested `(year, month)`
//! - the product's *last recorded* lag/rolling values
//!
//! Lag and rolling values are not rolled forward for targets further out;
//! every horizon reuses the same context.

use crate::domain::{
    FeatureRow, ForecastContext, ProductModel, FEATURE_COUNT, LAGS, MAX_FORECAST_YEAR, MAX_LOOKBACK,
    MIN_FORECAST_YEAR, ROLLING_WINDOWS,
};
use crate::error::ForecastError;
use crate::features::builder::TimeFeatures;
use crate::features::window::{from_end, tail_mean};

/// Extract the last known lag/rolling values from a product's feature rows.
///
/// Requires at least [`MAX_LOOKBACK`] rows.
pub fn forecast_context(product: &str, rows: &[FeatureRow]) -> Result<ForecastContext, ForecastError> {
    let prices: Vec<f64> = rows.iter().map(|r| r.price_avg).collect();
    let insufficient = || ForecastError::InsufficientHistory {
        product: product.to_string(),
        available: prices.len(),
        required: MAX_LOOKBACK,
    };

    let [lag_1, lag_3, lag_12] = LAGS.map(|k| from_end(&prices, k));
    let [ma_6, ma_12] = ROLLING_WINDOWS.map(|w| tail_mean(&prices, w));
    Ok(ForecastContext {
        lag_1: lag_1.ok_or_else(insufficient)?,
        lag_3: lag_3.ok_or_else(insufficient)?,
        lag_12: lag_12.ok_or_else(insufficient)?,
        ma_6: ma_6.ok_or_else(insufficient)?,
        ma_12: ma_12.ok_or_else(insufficient)?,
    })
}

/// Build the regressor vector for a target period.
pub fn forecast_regressors(
    year: i32,
    month: u32,
    min_year: i32,
    context: &ForecastContext,
) -> [f64; FEATURE_COUNT] {
    let time = TimeFeatures::new(year, month, min_year);
    [
        year as f64,
        month as f64,
        time.month_sin,
        time.month_cos,
        time.years_from_start as f64,
        time.time_index as f64,
        time.time_index_squared,
        context.lag_1,
        context.lag_3,
        context.lag_12,
        context.ma_6,
        context.ma_12,
    ]
}

/// Predict the average price of `model.product` for `(year, month)`.
pub fn predict_price(
    model: &ProductModel,
    context: &ForecastContext,
    year: i32,
    month: u32,
    min_year: i32,
) -> Result<f64, ForecastError> {
    if !(1..=12).contains(&month) {
        return Err(ForecastError::Validation(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    if !(MIN_FORECAST_YEAR..=MAX_FORECAST_YEAR).contains(&year) {
        return Err(ForecastError::Validation(format!(
            "year must be between {MIN_FORECAST_YEAR} and {MAX_FORECAST_YEAR}, got {year}"
        )));
    }
    let x = forecast_regressors(year, month, min_year, context);
    let y = model.model.predict(&x);
    if !y.is_finite() {
        return Err(ForecastError::Fit {
            product: model.product.clone(),
        });
    }
    Ok(y)
}
