//! CSV ingest.
//!
//! This module turns a sales export into `RawSalesRecord`s.
//!
//! Design goals:
//! - **Strict schema** for required columns (fail fast, exit code 2)
//! - **Row-level validation** for product/price (skip bad rows, but report them)
//! - **Dates untouched**: raw date strings are passed through; the normalizer
//!   owns date parsing and fails the load on a malformed value

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::RawSalesRecord;
use crate::error::{AppError, ForecastError};

/// Accepted spellings for the product identifier column (after normalization).
const PRODUCT_COLUMNS: [&str; 2] = ["product_name", "product"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Which optional columns were present in the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionalColumns {
    pub category: bool,
    pub location: bool,
    pub platform: bool,
    pub units_sold: bool,
    pub revenue: bool,
    pub discount: bool,
}

impl OptionalColumns {
    /// All columns the revenue model needs.
    pub fn supports_revenue(&self) -> bool {
        self.revenue && self.category && self.location && self.platform
    }

    /// All columns the discount model needs.
    pub fn supports_discount(&self) -> bool {
        self.discount && self.units_sold && self.category && self.location && self.platform
    }
}

/// Ingest output: records + row errors + bookkeeping.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<RawSalesRecord>,
    pub columns: OptionalColumns,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load a sales CSV from disk.
pub fn load_sales_csv(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    read_sales_csv(file)
}

/// Parse a sales CSV from any reader.
pub fn read_sales_csv<R: Read>(input: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let product_col = ensure_required_columns_exist(&header_map)?;

    let columns = OptionalColumns {
        category: header_map.contains_key("category"),
        location: header_map.contains_key("location"),
        platform: header_map.contains_key("platform"),
        units_sold: header_map.contains_key("units_sold"),
        revenue: header_map.contains_key("revenue"),
        discount: header_map.contains_key("discount"),
    };

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map, product_col) {
            Ok(row) => records.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = records.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "No valid rows remain after ingest."));
    }

    tracing::info!(
        rows_read,
        rows_used,
        row_errors = row_errors.len(),
        "ingested sales data"
    );
    for err in row_errors.iter().take(5) {
        tracing::warn!(line = err.line, "skipped row: {}", err.message);
    }

    Ok(IngestedData {
        records,
        columns,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase().replace(' ', "_")
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<&'static str, AppError> {
    let product_col = PRODUCT_COLUMNS
        .into_iter()
        .find(|c| header_map.contains_key(*c))
        .ok_or_else(|| ForecastError::MissingColumn("product_name".to_string()))?;

    for name in ["date", "price"] {
        if !header_map.contains_key(name) {
            return Err(ForecastError::MissingColumn(name.to_string()).into());
        }
    }
    Ok(product_col)
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    product_col: &str,
) -> Result<RawSalesRecord, String> {
    let product = get_required(record, header_map, product_col)?.to_string();
    let date = get_required(record, header_map, "date")?.to_string();
    let price_raw = get_required(record, header_map, "price")?;
    let price = parse_opt_f64(Some(price_raw)).ok_or_else(|| format!("Invalid `price` value '{price_raw}'."))?;

    Ok(RawSalesRecord {
        product,
        date,
        price,
        category: get_optional(record, header_map, "category").map(str::to_string),
        location: get_optional(record, header_map, "location").map(str::to_string),
        platform: get_optional(record, header_map, "platform").map(str::to_string),
        units_sold: parse_opt_f64(get_optional(record, header_map, "units_sold")),
        revenue: parse_opt_f64(get_optional(record, header_map, "revenue")),
        discount: parse_opt_f64(get_optional(record, header_map, "discount")),
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?;
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_spreadsheet_style_headers() {
        let csv = "\u{feff}Date,Product Name,Category,Units Sold,Price,Revenue,Discount,Location,Platform\n\
                   2020-01-06,Vitamin C,Vitamin,10,12.5,125.0,0.1,USA,Amazon\n\
                   2020-01-13, Zinc ,Mineral,4,8.0,32.0,0.0,UK,Walmart\n";
        let data = read_sales_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_used, 2);
        assert!(data.columns.supports_revenue());
        assert!(data.columns.supports_discount());
        assert_eq!(data.records[1].product, "Zinc");
        assert_eq!(data.records[0].units_sold, Some(10.0));
        assert_eq!(data.records[0].discount, Some(0.1));
        assert_eq!(data.records[0].category.as_deref(), Some("Vitamin"));
        assert_eq!(data.records[0].revenue, Some(125.0));
    }

    #[test]
    fn missing_price_column_fails_fast() {
        let csv = "date,product\n2020-01-01,A\n";
        let err = read_sales_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn bad_price_rows_are_skipped_and_reported() {
        let csv = "product,date,price\nA,2020-01-01,abc\nA,2020-02-01,3.5\nA,2020-03-01,\n";
        let data = read_sales_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 3);
        assert_eq!(data.rows_used, 1);
        assert_eq!(data.row_errors.len(), 2);
        assert_eq!(data.row_errors[0].line, 2);
        assert!(!data.columns.supports_revenue());
        assert!(!data.columns.supports_discount());
    }

    #[test]
    fn malformed_dates_pass_through_to_normalizer() {
        let csv = "product,date,price\nA,not-a-date,3.5\n";
        let data = read_sales_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.records[0].date, "not-a-date");
    }

    #[test]
    fn no_usable_rows_is_an_error() {
        let csv = "product,date,price\nA,2020-01-01,x\n";
        let err = read_sales_csv(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
