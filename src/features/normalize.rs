//! Date normalization: raw date strings -> calendar year/month.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::domain::{NormalizedRecord, RawSalesRecord};
use crate::error::ForecastError;

/// Date-only formats accepted in the dataset.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Datetime formats whose date part is kept.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse every record's date and attach `year`/`month`.
///
/// Output length always equals input length. The first unparseable date aborts
/// the whole batch with [`ForecastError::Parse`]; `record` is the 0-based
/// position in `records`.
pub fn normalize_records(records: &[RawSalesRecord]) -> Result<Vec<NormalizedRecord>, ForecastError> {
    records
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let date = parse_date(&raw.date).ok_or_else(|| ForecastError::Parse {
                record: idx,
                value: raw.date.clone(),
            })?;
            Ok(NormalizedRecord {
                raw: raw.clone(),
                date,
                year: date.year(),
                month: date.month(),
            })
        })
        .collect()
}

/// Parse a single date value.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    // Fractional seconds and offsets are tolerated by cutting at the seconds field.
    let head = s.get(..19).unwrap_or(s);
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(head, fmt) {
            return Some(dt.date());
        }
    }
    None
}
