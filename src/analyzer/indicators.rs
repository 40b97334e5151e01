use crate::model::{IndicatorSeries, PriceSeries};

/// Window of the short moving average.
pub const SHORT_WINDOW: usize = 20;
/// Window of the long moving average.
pub const LONG_WINDOW: usize = 50;

/// Rolling arithmetic mean over a trailing window.
///
/// Boundary condition: for i < window the window shrinks to the data
/// available so far (mean of `values[0..=i]`), so every index has a
/// value. The minimum window size is one observation.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        let slice = &values[start..=i];
        out.push(slice.iter().sum::<f64>() / slice.len() as f64);
    }
    out
}

/// Period-over-period fractional change of the close price.
///
/// The first element is `None` (no prior close). A zero prior close
/// produces an infinite or NaN value, which is propagated as-is.
pub fn daily_returns(closes: &[f64]) -> Vec<Option<f64>> {
    if closes.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(closes.len());
    out.push(None);
    for w in closes.windows(2) {
        out.push(Some((w[1] - w[0]) / w[0]));
    }
    out
}

/// Derives the 20/50-period moving averages and daily returns from a
/// price series. Returns new columns aligned with the input index; the
/// input is never mutated.
pub fn compute(series: &PriceSeries) -> IndicatorSeries {
    let closes = series.closes();
    IndicatorSeries {
        ma_short: rolling_mean(&closes, SHORT_WINDOW),
        ma_long: rolling_mean(&closes, LONG_WINDOW),
        daily_return: daily_returns(&closes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean(xs: &[f64]) -> f64 {
        xs.iter().sum::<f64>() / xs.len() as f64
    }

    #[test]
    fn rolling_mean_shrinks_at_the_start() {
        let values: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let ma = rolling_mean(&values, 20);
        assert_eq!(ma.len(), values.len());

        // i < window: mean of everything seen so far
        for i in 0..20 {
            let expected = mean(&values[..=i]);
            assert!((ma[i] - expected).abs() < 1e-12, "index {i}");
        }
        // i >= window: mean of exactly the trailing 20 values
        for i in 20..values.len() {
            let expected = mean(&values[i - 19..=i]);
            assert!((ma[i] - expected).abs() < 1e-12, "index {i}");
        }
    }

    #[test]
    fn rolling_mean_single_value() {
        assert_eq!(rolling_mean(&[42.0], 20), vec![42.0]);
    }

    #[test]
    fn rolling_mean_window_one_is_identity() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0];
        assert_eq!(rolling_mean(&values, 1), values.to_vec());
    }

    #[test]
    fn daily_returns_first_is_undefined() {
        let returns = daily_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 3);
        assert!(returns[0].is_none());
        assert!((returns[1].unwrap() - 0.1).abs() < 1e-12);
        assert!((returns[2].unwrap() - (99.0 / 110.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn daily_returns_zero_prior_close_propagates() {
        let returns = daily_returns(&[0.0, 5.0]);
        assert!(returns[1].unwrap().is_infinite());
    }

    #[test]
    fn daily_returns_empty_input() {
        assert!(daily_returns(&[]).is_empty());
    }
}
