//! Per-product model training.
//!
//! Each product's regression is independent of every other product's, so the
//! fits run in parallel. Results are collected into `BTreeMap`s, which keeps
//! the output identical regardless of scheduling.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::domain::{FeatureRow, FeatureTable, ProductModel};
use crate::error::ForecastError;
use crate::math::{fit_linear, rmse};

/// Output of a training run.
#[derive(Debug, Clone, Default)]
pub struct TrainedModels {
    /// product -> fitted model; only products with at least one feature row.
    pub models: BTreeMap<String, ProductModel>,
    /// Products whose regression could not be solved.
    pub failures: Vec<ForecastError>,
}

/// Group feature rows by product, preserving chronological order.
pub fn rows_by_product(table: &FeatureTable) -> BTreeMap<String, Vec<FeatureRow>> {
    let mut grouped: BTreeMap<String, Vec<FeatureRow>> = BTreeMap::new();
    for row in &table.rows {
        grouped.entry(row.product.clone()).or_default().push(row.clone());
    }
    grouped
}

/// Fit one price model on a single product's rows.
pub fn fit_product(product: &str, rows: &[FeatureRow]) -> Result<ProductModel, ForecastError> {
    let x: Vec<Vec<f64>> = rows.iter().map(|r| r.regressors().to_vec()).collect();
    let y: Vec<f64> = rows.iter().map(|r| r.price_avg).collect();

    let model = fit_linear(&x, &y).ok_or_else(|| ForecastError::Fit {
        product: product.to_string(),
    })?;
    let rmse = rmse(&model, &x, &y);

    Ok(ProductModel {
        product: product.to_string(),
        model,
        n_obs: rows.len(),
        rmse,
    })
}

/// Fit one model per product present in the feature table.
///
/// Products absent from the table (all rows dropped for short history) are
/// simply absent from the output. A failed fit is recorded and does not affect
/// other products.
pub fn train_models(table: &FeatureTable) -> TrainedModels {
    let grouped = rows_by_product(table);

    let results: Vec<(String, Result<ProductModel, ForecastError>)> = grouped
        .par_iter()
        .map(|(product, rows)| (product.clone(), fit_product(product, rows)))
        .collect();

    let mut out = TrainedModels::default();
    for (product, result) in results {
        match result {
            Ok(model) => {
                tracing::debug!(product = %product, n_obs = model.n_obs, rmse = model.rmse, "fitted product model");
                out.models.insert(product, model);
            }
            Err(err) => {
                tracing::warn!(product = %product, "{err}");
                out.failures.push(err);
            }
        }
    }

    tracing::info!(
        trained = out.models.len(),
        failed = out.failures.len(),
        "trained product models"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawSalesRecord;
    use crate::features::{build_features, normalize_records};

    fn monthly(product: &str, months: usize, price: impl Fn(usize) -> f64) -> Vec<RawSalesRecord> {
        (0..months)
            .map(|i| {
                let year = 2020 + (i / 12) as i32;
                let month = i % 12 + 1;
                RawSalesRecord::new(product, format!("{year}-{month:02}-01"), price(i))
            })
            .collect()
    }

    fn table(raw: &[RawSalesRecord]) -> FeatureTable {
        build_features(&normalize_records(raw).unwrap())
    }

    #[test]
    fn one_model_per_product_with_rows() {
        let mut raw = monthly("A", 24, |i| 10.0 + i as f64);
        raw.extend(monthly("B", 18, |i| 30.0 - 0.5 * i as f64));
        raw.extend(monthly("Short", 12, |_| 3.0));
        let trained = train_models(&table(&raw));

        let products: Vec<&str> = trained.models.keys().map(String::as_str).collect();
        assert_eq!(products, vec!["A", "B"]);
        assert!(trained.failures.is_empty());
        assert_eq!(trained.models["A"].n_obs, 12);
        assert_eq!(trained.models["B"].n_obs, 6);
    }

    #[test]
    fn linear_series_is_fitted_in_sample() {
        let raw = monthly("A", 36, |i| 5.0 + 0.25 * i as f64);
        let t = table(&raw);
        let trained = train_models(&t);
        let model = &trained.models["A"];
        assert!(model.rmse < 1e-6, "rmse={}", model.rmse);
        for row in t.product_rows("A") {
            let pred = model.model.predict(&row.regressors());
            assert!((pred - row.price_avg).abs() < 1e-6);
        }
    }

    #[test]
    fn training_is_independent_of_other_products() {
        let a = monthly("A", 30, |i| 8.0 + (i as f64 * 0.7).sin());
        let mut both = a.clone();
        both.extend(monthly("B", 30, |i| 100.0 + i as f64));

        let alone = train_models(&table(&a));
        let together = train_models(&table(&both));
        assert_eq!(alone.models["A"], together.models["A"]);
    }
}
