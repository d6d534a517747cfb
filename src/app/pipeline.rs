//! Shared pipeline logic used by every CLI subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> normalize -> features -> per-product training -> snapshot
//!
//! Subcommands then only differ in how they present or query the result.

use std::time::Instant;

use crate::domain::{FeatureTable, PipelineConfig, MAX_LOOKBACK};
use crate::error::{AppError, ForecastError};
use crate::features::{build_features, normalize_records};
use crate::io::ingest::{load_sales_csv, IngestedData};
use crate::registry::ModelSnapshot;
use crate::discount::fit_discount_model;
use crate::revenue::fit_revenue_model;
use crate::train::train_models;

/// All computed outputs of a single pipeline run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub table: FeatureTable,
    pub snapshot: ModelSnapshot,
    /// Products with too few monthly periods to produce any feature row.
    pub insufficient: Vec<ForecastError>,
    /// Products whose regression failed.
    pub failures: Vec<ForecastError>,
}

/// Execute the full pipeline from the configured CSV.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunOutput, AppError> {
    let ingest = load_sales_csv(&config.data_path)?;
    run_pipeline_with_data(config, ingest)
}

/// Execute the pipeline on already-ingested records.
pub fn run_pipeline_with_data(config: &PipelineConfig, ingest: IngestedData) -> Result<RunOutput, AppError> {
    let started = Instant::now();

    // 1) Dates -> year/month. A malformed date aborts the run.
    let normalized = normalize_records(&ingest.records)?;

    // 2) Monthly features.
    let table = build_features(&normalized);

    let insufficient: Vec<ForecastError> = table
        .periods_per_product
        .iter()
        .filter(|(_, periods)| *periods <= MAX_LOOKBACK)
        .map(|(product, periods)| ForecastError::InsufficientHistory {
            product: product.clone(),
            available: *periods,
            required: MAX_LOOKBACK + 1,
        })
        .collect();
    for err in &insufficient {
        tracing::warn!("{err}");
    }

    // 3) One model per product.
    let trained = train_models(&table);
    let failures = trained.failures.clone();

    // 4) Optional revenue model.
    let revenue = if config.train_revenue && ingest.columns.supports_revenue() {
        let model = fit_revenue_model(&normalized);
        if model.is_none() {
            tracing::warn!("revenue model could not be fitted");
        }
        model
    } else {
        None
    };

    // 5) Optional discount model.
    let discount = if config.train_discount && ingest.columns.supports_discount() {
        let model = fit_discount_model(&normalized);
        if model.is_none() {
            tracing::warn!("discount model could not be fitted");
        }
        model
    } else {
        None
    };

    let snapshot = ModelSnapshot::new(&table, trained, revenue, discount);

    tracing::info!(
        products = snapshot.models.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "pipeline finished"
    );

    Ok(RunOutput {
        ingest,
        table,
        snapshot,
        insufficient,
        failures,
    })
}
