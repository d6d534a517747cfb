//! Monthly feature table construction.
//!
//! Pipeline:
//! 1. mean price per `(product, year, month)`
//! 2. time index and seasonal encoding (global minimum year as reference)
//! 3. per-product chronological series
//! 4. lag / trailing-mean regressors
//! 5. drop rows with any undefined regressor

use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::domain::{
    FeatureRow, FeatureTable, MonthlyAggregate, NormalizedRecord, LAGS, MAX_LOOKBACK, ROLLING_WINDOWS,
};
use crate::features::window::{lag, trailing_mean};

/// Mean price per `(product, year, month)`, sorted by that key.
pub fn monthly_aggregates(records: &[NormalizedRecord]) -> Vec<MonthlyAggregate> {
    let mut groups: BTreeMap<(String, i32, u32), (f64, usize)> = BTreeMap::new();
    for r in records {
        let entry = groups
            .entry((r.raw.product.clone(), r.year, r.month))
            .or_insert((0.0, 0));
        entry.0 += r.raw.price;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|((product, year, month), (sum, count))| MonthlyAggregate {
            product,
            year,
            month,
            price_avg: sum / count as f64,
        })
        .collect()
}

/// Seasonal encoding of a month on the unit circle.
pub fn month_cycle(month: u32) -> (f64, f64) {
    let angle = 2.0 * PI * month as f64 / 12.0;
    (angle.sin(), angle.cos())
}

/// Deterministic calendar regressors for `(year, month)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeFeatures {
    pub years_from_start: i32,
    pub time_index: i32,
    pub time_index_squared: f64,
    pub month_sin: f64,
    pub month_cos: f64,
}

impl TimeFeatures {
    pub fn new(year: i32, month: u32, min_year: i32) -> Self {
        // Saturates instead of overflowing on extreme years.
        let years_from_start = year.saturating_sub(min_year);
        let time_index = years_from_start.saturating_mul(12).saturating_add(month as i32);
        let (month_sin, month_cos) = month_cycle(month);
        Self {
            years_from_start,
            time_index,
            time_index_squared: (time_index as f64).powi(2),
            month_sin,
            month_cos,
        }
    }
}

/// Build the feature table from normalized records.
///
/// `years_from_start` is measured from the earliest year across *all*
/// products, so a product that starts later does not start at zero.
pub fn build_features(records: &[NormalizedRecord]) -> FeatureTable {
    let aggregates = monthly_aggregates(records);
    let Some(min_year) = aggregates.iter().map(|a| a.year).min() else {
        return FeatureTable {
            min_year: 0,
            rows: Vec::new(),
            periods_per_product: Vec::new(),
        };
    };

    // Aggregates come out of a BTreeMap keyed by (product, year, month), so each
    // product's run is already contiguous and chronological.
    let mut series: BTreeMap<&str, Vec<&MonthlyAggregate>> = BTreeMap::new();
    for agg in &aggregates {
        series.entry(agg.product.as_str()).or_default().push(agg);
    }

    let mut rows = Vec::new();
    let mut periods_per_product = Vec::with_capacity(series.len());

    for (product, periods) in &series {
        periods_per_product.push((product.to_string(), periods.len()));
        if periods.len() <= MAX_LOOKBACK {
            tracing::debug!(product, periods = periods.len(), "not enough periods for lag features");
            continue;
        }

        let prices: Vec<f64> = periods.iter().map(|a| a.price_avg).collect();
        for (i, agg) in periods.iter().enumerate() {
            let [lag_1, lag_3, lag_12] = LAGS.map(|k| lag(&prices, i, k));
            let [ma_6, ma_12] = ROLLING_WINDOWS.map(|w| trailing_mean(&prices, i, w));
            let (Some(price_lag_1), Some(price_lag_3), Some(price_lag_12), Some(price_ma_6), Some(price_ma_12)) =
                (lag_1, lag_3, lag_12, ma_6, ma_12)
            else {
                continue;
            };

            let time = TimeFeatures::new(agg.year, agg.month, min_year);
            rows.push(FeatureRow {
                product: agg.product.clone(),
                year: agg.year,
                month: agg.month,
                price_avg: agg.price_avg,
                years_from_start: time.years_from_start,
                time_index: time.time_index,
                time_index_squared: time.time_index_squared,
                month_sin: time.month_sin,
                month_cos: time.month_cos,
                price_lag_1,
                price_lag_3,
                price_lag_12,
                price_ma_6,
                price_ma_12,
            });
        }
    }

    tracing::info!(
        products = periods_per_product.len(),
        monthly_rows = aggregates.len(),
        feature_rows = rows.len(),
        min_year,
        "built feature table"
    );

    FeatureTable {
        min_year,
        rows,
        periods_per_product,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawSalesRecord;
    use crate::features::normalize::normalize_records;

    fn monthly(product: &str, start_year: i32, months: usize, price: impl Fn(usize) -> f64) -> Vec<RawSalesRecord> {
        (0..months)
            .map(|i| {
                let year = start_year + (i / 12) as i32;
                let month = i % 12 + 1;
                RawSalesRecord::new(product, format!("{year}-{month:02}-15"), price(i))
            })
            .collect()
    }

    fn build(raw: &[RawSalesRecord]) -> FeatureTable {
        build_features(&normalize_records(raw).unwrap())
    }

    #[test]
    fn aggregates_average_within_a_month() {
        let raw = vec![
            RawSalesRecord::new("A", "2020-01-03", 10.0),
            RawSalesRecord::new("A", "2020-01-20", 14.0),
            RawSalesRecord::new("B", "2020-01-05", 1.0),
            RawSalesRecord::new("A", "2020-02-01", 5.0),
        ];
        let aggs = monthly_aggregates(&normalize_records(&raw).unwrap());
        let keyed: Vec<(&str, i32, u32, f64)> = aggs
            .iter()
            .map(|a| (a.product.as_str(), a.year, a.month, a.price_avg))
            .collect();
        assert_eq!(
            keyed,
            vec![("A", 2020, 1, 12.0), ("A", 2020, 2, 5.0), ("B", 2020, 1, 1.0)]
        );
    }

    #[test]
    fn twelve_periods_yield_no_rows_thirteen_yield_one() {
        let mut raw = monthly("Omega-3", 2020, 12, |i| 5.0 + i as f64);
        raw.extend(monthly("Zinc", 2020, 13, |i| 2.0 + i as f64));
        let table = build(&raw);

        assert_eq!(table.product_rows("Omega-3").count(), 0);
        assert_eq!(table.product_rows("Zinc").count(), 1);
        assert_eq!(
            table.periods_per_product,
            vec![("Omega-3".to_string(), 12), ("Zinc".to_string(), 13)]
        );
    }

    #[test]
    fn lag_and_rolling_values_match_definitions() {
        let raw = monthly("A", 2020, 30, |i| (i * i) as f64 * 0.1 + 3.0);
        let table = build(&raw);
        let prices: Vec<f64> = (0..30).map(|i| (i * i) as f64 * 0.1 + 3.0).collect();

        assert_eq!(table.rows.len(), 30 - 12);
        for (offset, row) in table.rows.iter().enumerate() {
            let n = offset + 12;
            assert!((row.price_avg - prices[n]).abs() < 1e-12);
            assert!((row.price_lag_1 - prices[n - 1]).abs() < 1e-12);
            assert!((row.price_lag_3 - prices[n - 3]).abs() < 1e-12);
            assert!((row.price_lag_12 - prices[n - 12]).abs() < 1e-12);
            let ma6: f64 = prices[n - 5..=n].iter().sum::<f64>() / 6.0;
            let ma12: f64 = prices[n - 11..=n].iter().sum::<f64>() / 12.0;
            assert!((row.price_ma_6 - ma6).abs() < 1e-12);
            assert!((row.price_ma_12 - ma12).abs() < 1e-12);
        }
    }

    #[test]
    fn time_features_use_global_minimum_year() {
        let mut raw = monthly("Early", 2018, 14, |_| 1.0);
        raw.extend(monthly("Late", 2021, 14, |_| 2.0));
        let table = build(&raw);
        assert_eq!(table.min_year, 2018);

        // Late's first feature row is its 13th period: January 2022.
        let late = table.product_rows("Late").next().unwrap();
        assert_eq!((late.year, late.month), (2022, 1));
        assert_eq!(late.years_from_start, 4);
        assert_eq!(late.time_index, 4 * 12 + 1);
        assert_eq!(late.time_index_squared, 49.0 * 49.0);
    }

    #[test]
    fn input_order_does_not_change_the_table() {
        let mut raw = monthly("A", 2020, 20, |i| 10.0 + i as f64 * 0.5);
        raw.extend(monthly("B", 2019, 16, |i| 4.0 - i as f64 * 0.1));
        let forward = build(&raw);
        let again = build(&raw);
        assert_eq!(forward, again);

        raw.reverse();
        assert_eq!(build(&raw), forward);
    }

    #[test]
    fn seasonal_encoding_is_on_the_unit_circle() {
        for m in 1..=12 {
            let (s, c) = month_cycle(m);
            assert!((s * s + c * c - 1.0).abs() < 1e-12);
        }
        let (s, c) = month_cycle(12);
        assert!(s.abs() < 1e-12);
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = build_features(&[]);
        assert!(table.rows.is_empty());
        assert!(table.periods_per_product.is_empty());
    }

    #[test]
    fn time_features_saturate_on_extreme_years() {
        let t = TimeFeatures::new(i32::MAX, 12, 2020);
        assert_eq!(t.time_index, i32::MAX);
        assert!(t.time_index_squared.is_finite());
    }
}
