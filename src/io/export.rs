//! Export the feature table (CSV) and fitted coefficients (JSON).
//!
//! Both exports are meant for inspection in spreadsheets or downstream
//! scripts. Nothing in this crate reads them back.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{FeatureRow, ProductModel, FEATURE_NAMES};
use crate::error::AppError;

/// Write the feature table to a CSV file, one column per `FeatureRow` field.
pub fn write_features_csv(path: &Path, rows: &[FeatureRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create feature CSV '{}': {e}", path.display())))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(4, format!("Failed to write feature CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush feature CSV: {e}")))?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct ModelsFile<'a> {
    tool: &'static str,
    base_year: i32,
    features: &'static [&'static str],
    models: Vec<ModelEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ModelEntry<'a> {
    product: &'a str,
    n_obs: usize,
    rmse: f64,
    intercept: f64,
    coefficients: BTreeMap<&'static str, f64>,
}

/// Write fitted coefficients, keyed by feature name, as pretty JSON.
pub fn write_models_json<'a>(
    path: &Path,
    base_year: i32,
    models: impl IntoIterator<Item = &'a ProductModel>,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create models JSON '{}': {e}", path.display())))?;

    let doc = ModelsFile {
        tool: "pf",
        base_year,
        features: &FEATURE_NAMES,
        models: models
            .into_iter()
            .map(|m| ModelEntry {
                product: &m.product,
                n_obs: m.n_obs,
                rmse: m.rmse,
                intercept: m.model.intercept,
                coefficients: FEATURE_NAMES
                    .iter()
                    .copied()
                    .zip(m.model.coefficients.iter().copied())
                    .collect(),
            })
            .collect(),
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(4, format!("Failed to write models JSON: {e}")))?;

    Ok(())
}
