use crate::model::{IndicatorSeries, PriceSeries};

/// Trading periods per year used to annualize return volatility.
const PERIODS_PER_YEAR: f64 = 252.0;

pub fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (n - 1 denominator). NaN for fewer than
/// two values.
pub fn sample_std(xs: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(xs);
    (xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
}

/// Quantile with linear interpolation between the two nearest ranks.
/// Expects a sorted slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    }
}

/// Standard deviation of the defined daily returns scaled by sqrt of
/// the trading periods in a year. NaN until two returns exist.
pub fn annualized_volatility(daily_returns: &[Option<f64>]) -> f64 {
    let defined: Vec<f64> = daily_returns.iter().filter_map(|r| *r).collect();
    sample_std(&defined) * PERIODS_PER_YEAR.sqrt()
}

/// Formats the summary block: date range, latest values, descriptive
/// statistics of the close series, the last five defined daily returns
/// and the annualized volatility. Pure formatting, no side effects.
pub fn render(series: &PriceSeries, indicators: &IndicatorSeries, ticker: &str) -> String {
    let first_date = series.bars[0].timestamp.format("%Y-%m-%d");
    let last_date = series.bars[series.len() - 1].timestamp.format("%Y-%m-%d");
    let last = &series.bars[series.len() - 1];

    let mut out = String::new();
    out.push_str(&format!(
        "=== {ticker} SUMMARY ({first_date} to {last_date}) ===\n"
    ));
    out.push_str(&format!("Last Close: {:.2}\n", last.close));
    out.push_str(&format!(
        "20-day MA:  {:.2}\n",
        indicators.ma_short[series.len() - 1]
    ));
    out.push_str(&format!(
        "50-day MA:  {:.2}\n",
        indicators.ma_long[series.len() - 1]
    ));

    let closes = series.closes();
    let mut sorted = closes.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    out.push_str("\nBasic statistics for Close:\n");
    out.push_str(&format!("{:<6} {}\n", "count", closes.len()));
    out.push_str(&format!("{:<6} {:.4}\n", "mean", mean(&closes)));
    out.push_str(&format!("{:<6} {:.4}\n", "std", sample_std(&closes)));
    out.push_str(&format!("{:<6} {:.4}\n", "min", sorted[0]));
    out.push_str(&format!("{:<6} {:.4}\n", "25%", quantile(&sorted, 0.25)));
    out.push_str(&format!("{:<6} {:.4}\n", "50%", quantile(&sorted, 0.50)));
    out.push_str(&format!("{:<6} {:.4}\n", "75%", quantile(&sorted, 0.75)));
    out.push_str(&format!("{:<6} {:.4}\n", "max", sorted[sorted.len() - 1]));

    out.push_str("\nDaily return (last 5):\n");
    let defined: Vec<(usize, f64)> = indicators
        .daily_return
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.map(|v| (i, v)))
        .collect();
    let tail_start = defined.len().saturating_sub(5);
    for (i, value) in &defined[tail_start..] {
        let date = series.bars[*i].timestamp.format("%Y-%m-%d");
        out.push_str(&format!("{date}  {value:>8.4}\n"));
    }

    out.push_str(&format!(
        "\nAnnualized volatility (stddev * sqrt(252)): {:.4}\n",
        annualized_volatility(&indicators.daily_return)
    ));

    out
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::analyzer::indicators;
    use crate::model::{PriceBar, PriceSeries};

    fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                timestamp: start + chrono::Days::new(i as u64),
                open: close,
                high: close,
                low: close,
                close,
                adj_close: close,
                volume: 1000.0,
            })
            .collect();
        PriceSeries {
            symbol: "TEST".into(),
            bars,
        }
    }

    #[test]
    fn sample_std_matches_reference() {
        // [1, 2, 3, 4]: sample variance 5/3
        let std = sample_std(&[1.0, 2.0, 3.0, 4.0]);
        assert!((std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn sample_std_undefined_below_two_values() {
        assert!(sample_std(&[1.0]).is_nan());
        assert!(sample_std(&[]).is_nan());
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile(&sorted, 0.50) - 2.5).abs() < 1e-12);
        assert!((quantile(&sorted, 0.75) - 3.25).abs() < 1e-12);
        assert_eq!(quantile(&sorted, 0.0), 1.0);
        assert_eq!(quantile(&sorted, 1.0), 4.0);
    }

    #[test]
    fn volatility_of_constant_returns_is_zero() {
        let returns = vec![None, Some(0.01), Some(0.01), Some(0.01)];
        assert!(annualized_volatility(&returns).abs() < 1e-12);
    }

    #[test]
    fn volatility_undefined_for_single_return() {
        assert!(annualized_volatility(&[None, Some(0.01)]).is_nan());
        assert!(annualized_volatility(&[None]).is_nan());
    }

    #[test]
    fn volatility_scales_sample_std() {
        let returns = vec![None, Some(0.01), Some(-0.01)];
        let expected = sample_std(&[0.01, -0.01]) * 252.0f64.sqrt();
        assert!((annualized_volatility(&returns) - expected).abs() < 1e-12);
    }

    #[test]
    fn render_contains_expected_lines() {
        let series = series_from_closes(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let ind = indicators::compute(&series);
        let block = render(&series, &ind, "TEST");

        assert!(block.starts_with("=== TEST SUMMARY (2024-01-01 to 2024-01-06) ==="));
        assert!(block.contains("Last Close: 105.00"));
        assert!(block.contains("count  6"));
        assert!(block.contains("min    100.0000"));
        assert!(block.contains("max    105.0000"));
        assert!(block.contains("Daily return (last 5):"));
        assert!(block.contains("Annualized volatility"));
        // excludes the undefined first return: exactly 5 dated return lines
        let return_lines = block
            .lines()
            .filter(|l| l.starts_with("2024-01-") && l.contains("0.0"))
            .count();
        assert_eq!(return_lines, 5);
    }

    #[test]
    fn render_single_point_series_reports_nan_stats() {
        let series = series_from_closes(&[100.0]);
        let ind = indicators::compute(&series);
        let block = render(&series, &ind, "TEST");

        assert!(block.contains("count  1"));
        assert!(block.contains("std    NaN"));
        assert!(block.contains("Annualized volatility (stddev * sqrt(252)): NaN"));
    }
}
