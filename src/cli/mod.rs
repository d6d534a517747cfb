//! Command-line parsing for the per-product price forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the feature engineering and model code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::{MAX_FORECAST_YEAR, MIN_FORECAST_YEAR};

/// Default dataset location when neither `--data` nor `PF_DATA_PATH` is set.
pub const DEFAULT_DATA_PATH: &str = "data/sales_data.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pf", version, about = "Per-product supplement price forecaster")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Train all product models and print a summary; optionally export features/coefficients.
    Train(TrainArgs),
    /// Forecast one product's average price for a target month (prints JSON).
    Forecast(ForecastArgs),
    /// Predict revenue from price, day and categorical context (prints JSON).
    Revenue(RevenueArgs),
    /// Predict the discount for a product at a price and sales volume (prints JSON).
    Discount(DiscountArgs),
    /// List the labels a categorical column accepts, `Unknown` last.
    Labels(LabelsArgs),
    /// Generate a synthetic sales CSV.
    Sample(SampleArgs),
}

/// Dataset location shared by subcommands that train.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Sales CSV (needs product, date and price columns).
    #[arg(long, env = "PF_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct TrainArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Export the engineered feature table to CSV.
    #[arg(long = "export-features")]
    pub export_features: Option<PathBuf>,

    /// Export fitted coefficients to JSON.
    #[arg(long = "export-models")]
    pub export_models: Option<PathBuf>,

    /// Print each product's named coefficients.
    #[arg(long)]
    pub coefficients: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Product identifier, exactly as in the dataset.
    #[arg(short, long)]
    pub product: String,

    /// Target year.
    #[arg(short, long, value_parser = clap::value_parser!(i32).range(MIN_FORECAST_YEAR as i64..=MAX_FORECAST_YEAR as i64))]
    pub year: i32,

    /// Target month (1-12).
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: u32,
}

#[derive(Debug, Args, Clone)]
pub struct RevenueArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Unit price (1-75).
    #[arg(long)]
    pub price: f64,

    /// Day of month (1-31).
    #[arg(long)]
    pub day: f64,

    #[arg(long, default_value = "Vitamin")]
    pub category: String,

    #[arg(long, default_value = "USA")]
    pub location: String,

    #[arg(long, default_value = "Amazon")]
    pub platform: String,
}

#[derive(Debug, Args, Clone)]
pub struct DiscountArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Product identifier, exactly as in the dataset.
    #[arg(short, long)]
    pub product: String,

    /// Unit price (1-75).
    #[arg(long)]
    pub price: f64,

    #[arg(long = "units-sold")]
    pub units_sold: u32,

    #[arg(long, default_value = "Vitamin")]
    pub category: String,

    #[arg(long, default_value = "USA")]
    pub location: String,

    #[arg(long, default_value = "Amazon")]
    pub platform: String,
}

/// Categorical columns with encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LabelColumn {
    Category,
    Location,
    Platform,
}

#[derive(Debug, Args, Clone)]
pub struct LabelsArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Which column's labels to list.
    #[arg(long, value_enum)]
    pub column: LabelColumn,

    /// Read a `{label: code}` JSON mapping instead of fitting from the dataset.
    #[arg(long)]
    pub mapping: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Number of products (max 8).
    #[arg(long, default_value_t = 4)]
    pub products: usize,

    /// Weekly rows per product.
    #[arg(long, default_value_t = 156)]
    pub weeks: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
