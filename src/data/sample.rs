//! Synthetic sales data generation.
//!
//! Produces weekly rows per product in the same column layout as the retail
//! supplement sales export, so the whole pipeline can be exercised without the
//! real dataset.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::Serialize;

use crate::error::AppError;

/// Product catalogue: (name, category, base price).
const CATALOGUE: [(&str, &str, f64); 8] = [
    ("Vitamin C", "Vitamin", 12.0),
    ("Omega-3", "Omega", 22.0),
    ("Whey Protein", "Protein", 45.0),
    ("Ashwagandha", "Herbal", 18.0),
    ("Zinc", "Mineral", 8.5),
    ("Biotin", "Vitamin", 10.0),
    ("Melatonin", "Sleep Aid", 9.0),
    ("Collagen Peptides", "Protein", 30.0),
];

const LOCATIONS: [&str; 3] = ["USA", "UK", "Canada"];
const PLATFORMS: [&str; 3] = ["Amazon", "Walmart", "iHerb"];

/// Knobs for sample generation.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub products: usize,
    pub weeks: usize,
    pub seed: u64,
    pub start: NaiveDate,
    /// Relative price drift per year (0.05 = +5%/year).
    pub annual_drift: f64,
    /// Relative noise std dev on price.
    pub noise: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            products: 4,
            weeks: 156,
            seed: 42,
            start: NaiveDate::from_ymd_opt(2020, 1, 6).unwrap_or_default(),
            annual_drift: 0.05,
            noise: 0.03,
        }
    }
}

/// One generated row; serializes with the export's header names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Product Name")]
    pub product: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Units Sold")]
    pub units_sold: u32,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Revenue")]
    pub revenue: f64,
    #[serde(rename = "Discount")]
    pub discount: f64,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Platform")]
    pub platform: String,
}

pub fn generate_sales(config: &SampleConfig) -> Result<Vec<SampleRow>, AppError> {
    if config.products == 0 || config.products > CATALOGUE.len() {
        return Err(AppError::new(
            2,
            format!("Product count must be between 1 and {}.", CATALOGUE.len()),
        ));
    }
    if config.weeks == 0 {
        return Err(AppError::new(2, "Week count must be > 0."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0 && config.annual_drift.is_finite()) {
        return Err(AppError::new(2, "Invalid drift/noise settings."));
    }

    let mut rng = StdRng::seed_from_u64(sample_seed(config));
    let noise = Normal::new(0.0, config.noise.max(f64::MIN_POSITIVE))
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut rows = Vec::with_capacity(config.products * config.weeks);
    for &(product, category, base) in CATALOGUE.iter().take(config.products) {
        for week in 0..config.weeks {
            let date = config.start + Duration::weeks(week as i64);
            let years = week as f64 / 52.0;

            // Trend + mild seasonality, then multiplicative noise.
            let season = 0.02 * (2.0 * std::f64::consts::PI * date.month() as f64 / 12.0).sin();
            let level = base * (1.0 + config.annual_drift * years + season);
            let price = round2((level * (1.0 + noise.sample(&mut rng))).max(0.01));

            let units_sold = rng.gen_range(50..=200u32);
            let discount = round2(rng.gen_range(0.0..0.25));
            let location = LOCATIONS[rng.gen_range(0..LOCATIONS.len())];
            let platform = PLATFORMS[rng.gen_range(0..PLATFORMS.len())];

            rows.push(SampleRow {
                date,
                product: product.to_string(),
                category: category.to_string(),
                units_sold,
                price,
                revenue: round2(price * units_sold as f64),
                discount,
                location: location.to_string(),
                platform: platform.to_string(),
            });
        }
    }

    Ok(rows)
}

/// Write generated rows as CSV.
pub fn write_sales_csv(path: &Path, rows: &[SampleRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(4, format!("Failed to write sample CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush sample CSV: {e}")))?;
    Ok(())
}

fn sample_seed(config: &SampleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.seed.hash(&mut hasher);
    config.products.hash(&mut hasher);
    config.weeks.hash(&mut hasher);
    config.start.hash(&mut hasher);
    config.annual_drift.to_bits().hash(&mut hasher);
    config.noise.to_bits().hash(&mut hasher);
    hasher.finish()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
