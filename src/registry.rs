//! In-memory model registry.
//!
//! A [`ModelSnapshot`] is built once and never mutated. The registry holds the
//! current snapshot behind an `Arc`; a rebuild publishes a whole new snapshot
//! and readers holding the previous `Arc` keep a consistent view.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::{FeatureRow, FeatureTable, ForecastContext, ForecastResponse, ProductModel};
use crate::error::ForecastError;
use crate::discount::DiscountModel;
use crate::revenue::RevenueModel;
use crate::train::{forecast_context, predict_price, rows_by_product, TrainedModels};

/// Everything needed to answer queries, frozen at build time.
#[derive(Debug, Clone)]
pub struct ModelSnapshot {
    pub min_year: i32,
    pub models: BTreeMap<String, ProductModel>,
    /// Per-product feature history, used to derive forecast contexts.
    pub history: BTreeMap<String, Vec<FeatureRow>>,
    pub revenue: Option<RevenueModel>,
    pub discount: Option<DiscountModel>,
    pub built_at: DateTime<Utc>,
}

impl ModelSnapshot {
    pub fn new(
        table: &FeatureTable,
        trained: TrainedModels,
        revenue: Option<RevenueModel>,
        discount: Option<DiscountModel>,
    ) -> Self {
        Self {
            min_year: table.min_year,
            models: trained.models,
            history: rows_by_product(table),
            revenue,
            discount,
            built_at: Utc::now(),
        }
    }

    /// Forecast a product's average price for `(year, month)`.
    pub fn forecast(&self, product: &str, year: i32, month: u32) -> Result<f64, ForecastError> {
        let model = self
            .models
            .get(product)
            .ok_or_else(|| ForecastError::UnknownProduct(product.to_string()))?;
        let context = self.context(product)?;
        predict_price(model, &context, year, month, self.min_year)
    }

    /// Forecast context for a product, if it has enough history.
    pub fn context(&self, product: &str) -> Result<ForecastContext, ForecastError> {
        let rows = self
            .history
            .get(product)
            .ok_or_else(|| ForecastError::UnknownProduct(product.to_string()))?;
        forecast_context(product, rows)
    }

    /// Forecast and wrap the outcome as a caller-facing response.
    ///
    /// Missing products and short histories become `not_found`; other
    /// failures are returned as errors.
    pub fn respond(&self, product: &str, year: i32, month: u32) -> Result<ForecastResponse, ForecastError> {
        match self.forecast(product, year, month) {
            Ok(predicted_price) => Ok(ForecastResponse::Ok {
                product: product.to_string(),
                year,
                month,
                predicted_price,
            }),
            Err(err) if err.is_not_found() => {
                tracing::info!(product, "forecast not available: {err}");
                Ok(ForecastResponse::NotFound {
                    product: product.to_string(),
                    reason: err.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    pub fn products(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}

/// Shared handle to the current snapshot.
#[derive(Debug)]
pub struct ModelRegistry {
    current: RwLock<Arc<ModelSnapshot>>,
}

impl ModelRegistry {
    pub fn new(snapshot: ModelSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot in effect right now.
    pub fn snapshot(&self) -> Arc<ModelSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Replace the current snapshot; returns the previous one.
    pub fn publish(&self, snapshot: ModelSnapshot) -> Arc<ModelSnapshot> {
        let next = Arc::new(snapshot);
        tracing::info!(products = next.models.len(), "published model snapshot");
        std::mem::replace(&mut *self.current.write(), next)
    }

    pub fn respond(&self, product: &str, year: i32, month: u32) -> Result<ForecastResponse, ForecastError> {
        self.snapshot().respond(product, year, month)
    }
}
