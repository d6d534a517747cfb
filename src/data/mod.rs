//! Input data sources beyond CSV ingest.

pub mod sample;

pub use sample::{generate_sales, write_sales_csv, SampleConfig, SampleRow};
