//! Revenue prediction from price, day of month, and categorical context.
//!
//! Categorical inputs go through [`CategoryEncoder`]s fitted on the dataset,
//! so unseen labels still produce a prediction via the `Unknown` code.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::domain::{LinearModel, NormalizedRecord};
use crate::encoding::CategoryEncoder;
use crate::error::ForecastError;
use crate::math::{fit_linear, rmse};

pub const PRICE_RANGE: (f64, f64) = (1.0, 75.0);
pub const DAY_RANGE: (f64, f64) = (1.0, 31.0);

fn default_category() -> String {
    "Vitamin".to_string()
}

fn default_location() -> String {
    "USA".to_string()
}

fn default_platform() -> String {
    "Amazon".to_string()
}

/// Revenue query payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRequest {
    pub price: f64,
    pub day: f64,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_platform")]
    pub platform: String,
}

impl RevenueRequest {
    pub fn new(price: f64, day: f64) -> Self {
        Self {
            price,
            day,
            category: default_category(),
            location: default_location(),
            platform: default_platform(),
        }
    }

    /// Check numeric bounds.
    pub fn validate(&self) -> Result<(), ForecastError> {
        check_range("price", self.price, PRICE_RANGE)?;
        check_range("day", self.day, DAY_RANGE)
    }
}

pub(crate) fn check_range(name: &str, value: f64, (lo, hi): (f64, f64)) -> Result<(), ForecastError> {
    if value.is_finite() && (lo..=hi).contains(&value) {
        Ok(())
    } else {
        Err(ForecastError::Validation(format!(
            "{name} must be between {lo} and {hi}, got {value}"
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueResponse {
    pub predicted_revenue: f64,
}

/// Linear revenue model plus the encoders it was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueModel {
    pub model: LinearModel,
    pub category: CategoryEncoder,
    pub location: CategoryEncoder,
    pub platform: CategoryEncoder,
    pub n_obs: usize,
    pub rmse: f64,
}

impl RevenueModel {
    fn regressors(&self, price: f64, day: f64, category: &str, location: &str, platform: &str) -> Vec<f64> {
        vec![
            price,
            day,
            self.category.encode(category) as f64,
            self.location.encode(location) as f64,
            self.platform.encode(platform) as f64,
        ]
    }

    pub fn predict(&self, request: &RevenueRequest) -> Result<RevenueResponse, ForecastError> {
        request.validate()?;
        let x = self.regressors(
            request.price,
            request.day,
            &request.category,
            &request.location,
            &request.platform,
        );
        Ok(RevenueResponse {
            predicted_revenue: self.model.predict(&x),
        })
    }
}

/// Fit the revenue model on records carrying revenue and all three categorical fields.
///
/// Returns `None` when no record qualifies or the regression cannot be solved.
pub fn fit_revenue_model(records: &[NormalizedRecord]) -> Option<RevenueModel> {
    let usable: Vec<(&NormalizedRecord, f64, &str, &str, &str)> = records
        .iter()
        .filter_map(|r| {
            Some((
                r,
                r.raw.revenue?,
                r.raw.category.as_deref()?,
                r.raw.location.as_deref()?,
                r.raw.platform.as_deref()?,
            ))
        })
        .collect();
    if usable.is_empty() {
        return None;
    }

    let mut out = RevenueModel {
        model: LinearModel {
            intercept: 0.0,
            coefficients: Vec::new(),
        },
        category: CategoryEncoder::fit(usable.iter().map(|u| u.2)),
        location: CategoryEncoder::fit(usable.iter().map(|u| u.3)),
        platform: CategoryEncoder::fit(usable.iter().map(|u| u.4)),
        n_obs: usable.len(),
        rmse: 0.0,
    };

    let x: Vec<Vec<f64>> = usable
        .iter()
        .map(|(r, _, c, l, p)| out.regressors(r.raw.price, r.date.day() as f64, c, l, p))
        .collect();
    let y: Vec<f64> = usable.iter().map(|u| u.1).collect();

    out.model = fit_linear(&x, &y)?;
    out.rmse = rmse(&out.model, &x, &y);

    tracing::info!(n_obs = out.n_obs, rmse = out.rmse, "trained revenue model");
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawSalesRecord;
    use crate::features::normalize_records;

    fn sales() -> Vec<NormalizedRecord> {
        let mut raw = Vec::new();
        for i in 0..40 {
            let price = 5.0 + (i % 10) as f64;
            let (category, platform, bonus) = if i % 2 == 0 {
                ("Vitamin", "Amazon", 0.0)
            } else {
                ("Herbal", "Walmart", 20.0)
            };
            let mut r = RawSalesRecord::new("P", format!("2023-03-{:02}", i % 28 + 1), price);
            r.category = Some(category.to_string());
            r.location = Some("USA".to_string());
            r.platform = Some(platform.to_string());
            r.revenue = Some(10.0 * price + bonus);
            raw.push(r);
        }
        normalize_records(&raw).unwrap()
    }

    #[test]
    fn price_out_of_range_is_a_validation_error() {
        let model = fit_revenue_model(&sales()).unwrap();
        let err = model.predict(&RevenueRequest::new(100.0, 15.0)).unwrap_err();
        assert!(matches!(err, ForecastError::Validation(_)));
        assert!(RevenueRequest::new(50.5, 0.0).validate().is_err());
    }

    #[test]
    fn unknown_category_still_predicts() {
        let model = fit_revenue_model(&sales()).unwrap();
        let mut req = RevenueRequest::new(25.0, 10.0);
        req.category = "NonExistentCategory".to_string();
        let resp = model.predict(&req).unwrap();
        assert!(resp.predicted_revenue.is_finite());
    }

    #[test]
    fn fitted_model_tracks_price() {
        let model = fit_revenue_model(&sales()).unwrap();
        let mut req = RevenueRequest::new(10.0, 5.0);
        req.category = "Vitamin".to_string();
        let low = model.predict(&req).unwrap().predicted_revenue;
        req.price = 12.0;
        let high = model.predict(&req).unwrap().predicted_revenue;
        assert!((high - low - 20.0).abs() < 1e-6, "slope off: {low} -> {high}");
    }

    #[test]
    fn missing_fields_use_defaults() {
        let req: RevenueRequest = serde_json::from_str(r#"{"price": 50.5, "day": 15}"#).unwrap();
        assert_eq!(req.category, "Vitamin");
        assert_eq!(req.location, "USA");
        assert_eq!(req.platform, "Amazon");
    }

    #[test]
    fn no_revenue_column_means_no_model() {
        let raw = vec![RawSalesRecord::new("P", "2023-01-01", 3.0)];
        assert!(fit_revenue_model(&normalize_records(&raw).unwrap()).is_none());
    }
}
