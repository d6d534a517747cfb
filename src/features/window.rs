//! Positional lookback windows over a chronologically sorted series.
//!
//! Every function returns `None` when the window reaches before the start of
//! the series. Positions are counted in observations, not calendar months.

/// Value `k` positions before `index`.
pub fn lag(series: &[f64], index: usize, k: usize) -> Option<f64> {
    if index >= series.len() {
        return None;
    }
    index.checked_sub(k).map(|i| series[i])
}

/// Mean of the `window` values ending at `index` (inclusive).
pub fn trailing_mean(series: &[f64], index: usize, window: usize) -> Option<f64> {
    if window == 0 || index >= series.len() || index + 1 < window {
        return None;
    }
    let segment = &series[index + 1 - window..=index];
    Some(segment.iter().sum::<f64>() / window as f64)
}

/// Lag `k` for every position.
pub fn lag_series(series: &[f64], k: usize) -> Vec<Option<f64>> {
    (0..series.len()).map(|i| lag(series, i, k)).collect()
}

/// Trailing mean over `window` for every position.
pub fn rolling_mean(series: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..series.len()).map(|i| trailing_mean(series, i, window)).collect()
}

/// Value `k` positions back from the end; `k = 1` is the last value.
pub fn from_end(series: &[f64], k: usize) -> Option<f64> {
    if k == 0 {
        return None;
    }
    series.len().checked_sub(k).map(|i| series[i])
}

/// Mean of the last `window` values.
pub fn tail_mean(series: &[f64], window: usize) -> Option<f64> {
    trailing_mean(series, series.len().checked_sub(1)?, window)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lag_is_undefined_for_first_k_positions() {
        let s = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(lag_series(&s, 3), vec![None, None, None, Some(1.0), Some(2.0)]);
        assert_eq!(lag(&s, 4, 0), Some(5.0));
        assert_eq!(lag(&s, 9, 1), None);
    }

    #[test]
    fn rolling_mean_includes_current_position() {
        let s = [2.0, 4.0, 6.0, 8.0];
        let out = rolling_mean(&s, 2);
        assert_eq!(out, vec![None, Some(3.0), Some(5.0), Some(7.0)]);
        assert_eq!(trailing_mean(&s, 3, 4), Some(5.0));
        assert_eq!(trailing_mean(&s, 2, 4), None);
        assert_eq!(trailing_mean(&s, 2, 0), None);
    }

    #[test]
    fn tail_helpers_read_from_the_end() {
        let s: Vec<f64> = (1..=12).map(f64::from).collect();
        assert_eq!(from_end(&s, 1), Some(12.0));
        assert_eq!(from_end(&s, 12), Some(1.0));
        assert_eq!(from_end(&s, 13), None);
        assert_eq!(from_end(&s, 0), None);
        assert_eq!(tail_mean(&s, 6), Some(9.5));
        assert_eq!(tail_mean(&[], 6), None);
    }
}
