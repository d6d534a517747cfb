//! Discount prediction from product, price, volume, and categorical context.
//!
//! Each categorical input is one-hot encoded against the labels seen during
//! fitting. An unseen label encodes as all zeros, so the prediction falls back
//! to the remaining regressors.

use serde::{Deserialize, Serialize};

use crate::domain::{LinearModel, NormalizedRecord};
use crate::encoding::CategoryEncoder;
use crate::error::ForecastError;
use crate::math::{fit_linear, rmse};
use crate::revenue::{check_range, PRICE_RANGE};

/// Discount query payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRequest {
    pub product_name: String,
    pub category: String,
    pub price: f64,
    pub units_sold: u32,
    pub location: String,
    pub platform: String,
}

impl DiscountRequest {
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.product_name.trim().is_empty() {
            return Err(ForecastError::Validation("product_name must not be empty".to_string()));
        }
        check_range("price", self.price, PRICE_RANGE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountResponse {
    pub predicted_discount: f64,
}

/// Linear discount model plus the label sets it was trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountModel {
    pub model: LinearModel,
    pub product: CategoryEncoder,
    pub category: CategoryEncoder,
    pub location: CategoryEncoder,
    pub platform: CategoryEncoder,
    pub n_obs: usize,
    pub rmse: f64,
}

struct DiscountInputs<'a> {
    product: &'a str,
    category: &'a str,
    location: &'a str,
    platform: &'a str,
    price: f64,
    units_sold: f64,
}

impl DiscountModel {
    fn regressors(&self, inputs: &DiscountInputs<'_>) -> Vec<f64> {
        let mut x = Vec::new();
        x.extend(self.product.one_hot(inputs.product));
        x.extend(self.category.one_hot(inputs.category));
        x.extend(self.location.one_hot(inputs.location));
        x.extend(self.platform.one_hot(inputs.platform));
        x.push(inputs.price);
        x.push(inputs.units_sold);
        x
    }

    pub fn predict(&self, request: &DiscountRequest) -> Result<DiscountResponse, ForecastError> {
        request.validate()?;
        let x = self.regressors(&DiscountInputs {
            product: &request.product_name,
            category: &request.category,
            location: &request.location,
            platform: &request.platform,
            price: request.price,
            units_sold: f64::from(request.units_sold),
        });
        Ok(DiscountResponse {
            predicted_discount: self.model.predict(&x),
        })
    }
}

/// Fit the discount model on records carrying discount, units sold, and all
/// three categorical fields.
///
/// Returns `None` when no record qualifies or the regression cannot be solved.
pub fn fit_discount_model(records: &[NormalizedRecord]) -> Option<DiscountModel> {
    let usable: Vec<(DiscountInputs<'_>, f64)> = records
        .iter()
        .filter_map(|r| {
            let raw = &r.raw;
            let inputs = DiscountInputs {
                product: raw.product.as_str(),
                category: raw.category.as_deref()?,
                location: raw.location.as_deref()?,
                platform: raw.platform.as_deref()?,
                price: raw.price,
                units_sold: raw.units_sold?,
            };
            Some((inputs, raw.discount?))
        })
        .collect();
    if usable.is_empty() {
        return None;
    }

    let mut out = DiscountModel {
        model: LinearModel {
            intercept: 0.0,
            coefficients: Vec::new(),
        },
        product: CategoryEncoder::fit(usable.iter().map(|(i, _)| i.product)),
        category: CategoryEncoder::fit(usable.iter().map(|(i, _)| i.category)),
        location: CategoryEncoder::fit(usable.iter().map(|(i, _)| i.location)),
        platform: CategoryEncoder::fit(usable.iter().map(|(i, _)| i.platform)),
        n_obs: usable.len(),
        rmse: 0.0,
    };

    let x: Vec<Vec<f64>> = usable.iter().map(|(i, _)| out.regressors(i)).collect();
    let y: Vec<f64> = usable.iter().map(|(_, d)| *d).collect();

    out.model = fit_linear(&x, &y)?;
    out.rmse = rmse(&out.model, &x, &y);

    tracing::info!(n_obs = out.n_obs, rmse = out.rmse, "trained discount model");
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawSalesRecord;
    use crate::features::normalize_records;

    fn sales() -> Vec<NormalizedRecord> {
        let mut raw = Vec::new();
        for i in 0..48 {
            let price = 10.0 + (i % 6) as f64;
            let units = 20.0 + (i % 5) as f64 * 10.0;
            let (platform, boost) = if i % 3 == 0 { ("iHerb", 0.05) } else { ("Amazon", 0.0) };
            let product = if i % 2 == 0 { "Zinc" } else { "Biotin" };
            let mut r = RawSalesRecord::new(product, format!("2023-05-{:02}", i % 28 + 1), price);
            r.category = Some("Mineral".to_string());
            r.location = Some("USA".to_string());
            r.platform = Some(platform.to_string());
            r.units_sold = Some(units);
            r.discount = Some(0.02 + 0.001 * units + boost);
            raw.push(r);
        }
        normalize_records(&raw).unwrap()
    }

    fn request(platform: &str, units_sold: u32) -> DiscountRequest {
        DiscountRequest {
            product_name: "Zinc".to_string(),
            category: "Mineral".to_string(),
            price: 12.0,
            units_sold,
            location: "USA".to_string(),
            platform: platform.to_string(),
        }
    }

    #[test]
    fn fitted_model_tracks_volume_and_platform() {
        let model = fit_discount_model(&sales()).unwrap();
        assert!(model.rmse < 1e-6, "rmse={}", model.rmse);

        let low = model.predict(&request("Amazon", 20)).unwrap().predicted_discount;
        let high = model.predict(&request("Amazon", 60)).unwrap().predicted_discount;
        assert!((high - low - 0.04).abs() < 1e-6, "volume slope off: {low} -> {high}");

        let iherb = model.predict(&request("iHerb", 20)).unwrap().predicted_discount;
        assert!((iherb - low - 0.05).abs() < 1e-6, "platform effect off: {low} -> {iherb}");
    }

    #[test]
    fn unseen_labels_still_predict() {
        let model = fit_discount_model(&sales()).unwrap();
        let mut req = request("Target", 40);
        req.product_name = "Ashwagandha".to_string();
        req.location = "Mars".to_string();
        let resp = model.predict(&req).unwrap();
        assert!(resp.predicted_discount.is_finite());
    }

    #[test]
    fn invalid_request_is_rejected() {
        let model = fit_discount_model(&sales()).unwrap();
        let mut req = request("Amazon", 10);
        req.price = 500.0;
        assert!(matches!(model.predict(&req), Err(ForecastError::Validation(_))));
        req.price = 12.0;
        req.product_name = "  ".to_string();
        assert!(matches!(model.predict(&req), Err(ForecastError::Validation(_))));
    }

    #[test]
    fn no_discount_column_means_no_model() {
        let raw = vec![RawSalesRecord::new("P", "2023-01-01", 3.0)];
        assert!(fit_discount_model(&normalize_records(&raw).unwrap()).is_none());
    }
}
