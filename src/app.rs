//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments
//! - runs the training pipeline
//! - answers forecast / revenue / discount queries or prints reports
//! - writes optional exports

use clap::Parser;

use crate::cli::{
    Command, DiscountArgs, ForecastArgs, LabelColumn, LabelsArgs, RevenueArgs, SampleArgs, TrainArgs,
};
use crate::data::{generate_sales, write_sales_csv, SampleConfig};
use crate::discount::DiscountRequest;
use crate::domain::{ForecastResponse, PipelineConfig};
use crate::encoding::{read_encoder_json, CategoryEncoder};
use crate::error::AppError;
use crate::registry::ModelRegistry;
use crate::revenue::RevenueRequest;

pub mod pipeline;

/// Exit code used when a forecast query resolves to `not_found`.
pub const EXIT_NOT_FOUND: u8 = 3;

/// Entry point for the `pf` binary.
///
/// Returns the process exit code on success paths that still need a non-zero
/// status (a `not_found` forecast).
pub fn run() -> Result<u8, AppError> {
    // `.env` is optional; flags and the real environment take precedence.
    dotenvy::dotenv().ok();
    crate::logging::init();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Train(args) => handle_train(args).map(|()| 0),
        Command::Forecast(args) => handle_forecast(args),
        Command::Revenue(args) => handle_revenue(args).map(|()| 0),
        Command::Discount(args) => handle_discount(args).map(|()| 0),
        Command::Labels(args) => handle_labels(args).map(|()| 0),
        Command::Sample(args) => handle_sample(args).map(|()| 0),
    }
}

fn handle_train(args: TrainArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args);
    let run = pipeline::run_pipeline(&config)?;

    println!("{}", crate::report::format_run_summary(&run));
    if args.coefficients {
        for model in run.snapshot.models.values() {
            println!("{}", crate::report::format_coefficients(model));
        }
    }

    // Optional exports.
    if let Some(path) = &config.export_features {
        crate::io::export::write_features_csv(path, &run.table.rows)?;
        tracing::info!(path = %path.display(), "wrote feature table");
    }
    if let Some(path) = &config.export_models {
        crate::io::export::write_models_json(path, run.table.min_year, run.snapshot.models.values())?;
        tracing::info!(path = %path.display(), "wrote model coefficients");
    }

    Ok(())
}

fn handle_forecast(args: ForecastArgs) -> Result<u8, AppError> {
    let mut config = PipelineConfig::new(args.data.data.clone());
    config.train_revenue = false;
    config.train_discount = false;
    let run = pipeline::run_pipeline(&config)?;

    let registry = ModelRegistry::new(run.snapshot);
    let response = registry.respond(&args.product, args.year, args.month)?;
    print_json(&response)?;

    Ok(match response {
        ForecastResponse::Ok { .. } => 0,
        ForecastResponse::NotFound { .. } => EXIT_NOT_FOUND,
    })
}

fn handle_revenue(args: RevenueArgs) -> Result<(), AppError> {
    let request = RevenueRequest {
        price: args.price,
        day: args.day,
        category: args.category,
        location: args.location,
        platform: args.platform,
    };
    // Reject bad payloads before paying for a training run.
    request.validate()?;

    let mut config = PipelineConfig::new(args.data.data);
    config.train_discount = false;
    let run = pipeline::run_pipeline(&config)?;
    let model = run.snapshot.revenue.as_ref().ok_or_else(|| {
        AppError::new(
            3,
            "Revenue model unavailable: dataset needs revenue, category, location and platform columns.",
        )
    })?;

    let response = model.predict(&request)?;
    print_json(&response)
}

fn handle_discount(args: DiscountArgs) -> Result<(), AppError> {
    let request = DiscountRequest {
        product_name: args.product,
        category: args.category,
        price: args.price,
        units_sold: args.units_sold,
        location: args.location,
        platform: args.platform,
    };
    request.validate()?;

    let mut config = PipelineConfig::new(args.data.data);
    config.train_revenue = false;
    let run = pipeline::run_pipeline(&config)?;
    let model = run.snapshot.discount.as_ref().ok_or_else(|| {
        AppError::new(
            3,
            "Discount model unavailable: dataset needs discount, units sold, category, location and platform columns.",
        )
    })?;

    let response = model.predict(&request)?;
    print_json(&response)
}

fn handle_labels(args: LabelsArgs) -> Result<(), AppError> {
    let encoder = match &args.mapping {
        Some(path) => read_encoder_json(path)?,
        None => {
            let ingest = crate::io::ingest::load_sales_csv(&args.data.data)?;
            let labels = ingest.records.iter().filter_map(|r| match args.column {
                LabelColumn::Category => r.category.as_deref(),
                LabelColumn::Location => r.location.as_deref(),
                LabelColumn::Platform => r.platform.as_deref(),
            });
            CategoryEncoder::fit(labels)
        }
    };
    print_json(&encoder.labels())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        products: args.products,
        weeks: args.weeks,
        seed: args.seed,
        ..SampleConfig::default()
    };
    let rows = generate_sales(&config)?;
    write_sales_csv(&args.out, &rows)?;
    tracing::info!(rows = rows.len(), path = %args.out.display(), "wrote sample data");
    Ok(())
}

pub fn pipeline_config_from_args(args: &TrainArgs) -> PipelineConfig {
    PipelineConfig {
        data_path: args.data.data.clone(),
        export_features: args.export_features.clone(),
        export_models: args.export_models.clone(),
        train_revenue: true,
        train_discount: true,
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(4, format!("Failed to serialize response: {e}")))?;
    println!("{text}");
    Ok(())
}
