use std::path::Path;
use std::process::Command;

use chrono::{DateTime, Duration, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::full_palette::ORANGE;
use tracing::warn;

use crate::analyzer::crossover;
use crate::model::{Crossover, IndicatorSeries, OutputError, PriceSeries};

const CHART_SIZE: (u32, u32) = (1200, 600);

/// Only the most recent crossovers of each kind are marked.
const MAX_MARKERS: usize = 3;

fn render_err<E: std::fmt::Display>(e: E) -> OutputError {
    OutputError::Render(e.to_string())
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
}

fn close_at(series: &PriceSeries, timestamp: DateTime<Utc>) -> Option<f64> {
    series
        .bars
        .binary_search_by_key(&timestamp, |b| b.timestamp)
        .ok()
        .map(|i| series.bars[i].close)
}

/// Resolves the marker points handed to the renderer: the last up to
/// three bullish and bearish crossovers, paired with the close price at
/// their timestamps.
pub fn marker_points(
    series: &PriceSeries,
    crossovers: &[Crossover],
) -> (Vec<(DateTime<Utc>, f64)>, Vec<(DateTime<Utc>, f64)>) {
    let (bullish, bearish) = crossover::split_by_kind(crossovers);
    let recent = |timestamps: Vec<DateTime<Utc>>| {
        timestamps[timestamps.len().saturating_sub(MAX_MARKERS)..]
            .iter()
            .filter_map(|&ts| close_at(series, ts).map(|close| (ts, close)))
            .collect::<Vec<_>>()
    };
    (recent(bullish), recent(bearish))
}

/// Renders close price, both moving averages and recent crossover
/// markers to `path`. The backend is chosen by extension: `.svg` gets a
/// vector chart, everything else a bitmap.
pub fn render(
    series: &PriceSeries,
    indicators: &IndicatorSeries,
    crossovers: &[Crossover],
    ticker: &str,
    path: &Path,
) -> Result<(), OutputError> {
    if is_svg(path) {
        let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
        draw(&root, series, indicators, crossovers, ticker)?;
        root.present().map_err(render_err)?;
    } else {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        draw(&root, series, indicators, crossovers, ticker)?;
        root.present().map_err(render_err)?;
    }
    Ok(())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &PriceSeries,
    indicators: &IndicatorSeries,
    crossovers: &[Crossover],
    ticker: &str,
) -> Result<(), OutputError> {
    root.fill(&WHITE).map_err(render_err)?;

    let x_start = series.bars[0].timestamp;
    let x_last = series.bars[series.len() - 1].timestamp;
    // a single bar still needs a non-empty axis
    let x_end = if x_last > x_start {
        x_last
    } else {
        x_start + Duration::days(1)
    };

    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for value in series
        .closes()
        .iter()
        .chain(&indicators.ma_short)
        .chain(&indicators.ma_long)
    {
        y_min = y_min.min(*value);
        y_max = y_max.max(*value);
    }
    let pad = ((y_max - y_min) * 0.05).max(1e-9);

    let mut chart = ChartBuilder::on(root)
        .caption(
            format!("{ticker} — Close Price with 20/50-day MA"),
            ("sans-serif", 24),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_start..x_end, (y_min - pad)..(y_max + pad))
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Price")
        .x_label_formatter(&|d: &DateTime<Utc>| d.format("%Y-%m").to_string())
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(
            series.bars.iter().map(|b| (b.timestamp, b.close)),
            &BLUE,
        ))
        .map_err(render_err)?
        .label("Close Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(LineSeries::new(
            series
                .bars
                .iter()
                .zip(&indicators.ma_short)
                .map(|(b, &ma)| (b.timestamp, ma)),
            &ORANGE,
        ))
        .map_err(render_err)?
        .label("20-day MA")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ORANGE));

    chart
        .draw_series(LineSeries::new(
            series
                .bars
                .iter()
                .zip(&indicators.ma_long)
                .map(|(b, &ma)| (b.timestamp, ma)),
            &GREEN,
        ))
        .map_err(render_err)?
        .label("50-day MA")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));

    let (bullish, bearish) = marker_points(series, crossovers);

    if !bullish.is_empty() {
        chart
            .draw_series(bullish.iter().map(|&(ts, close)| {
                EmptyElement::at((ts, close))
                    + Polygon::new(vec![(-6, 5), (6, 5), (0, -7)], GREEN.filled())
            }))
            .map_err(render_err)?
            .label("Bullish Cross")
            .legend(|(x, y)| {
                Polygon::new(vec![(x, y - 5), (x + 10, y - 5), (x + 5, y + 5)], GREEN.filled())
            });
    }

    if !bearish.is_empty() {
        chart
            .draw_series(bearish.iter().map(|&(ts, close)| {
                EmptyElement::at((ts, close))
                    + Polygon::new(vec![(-6, -5), (6, -5), (0, 7)], RED.filled())
            }))
            .map_err(render_err)?
            .label("Bearish Cross")
            .legend(|(x, y)| {
                Polygon::new(vec![(x, y + 5), (x + 10, y + 5), (x + 5, y - 5)], RED.filled())
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()
        .map_err(render_err)?;

    Ok(())
}

/// Hands the rendered chart to the platform image viewer.
pub fn show(path: &Path) {
    #[cfg(target_os = "macos")]
    let result = Command::new("open").arg(path).spawn();
    #[cfg(target_os = "windows")]
    let result = Command::new("cmd").args(["/C", "start", ""]).arg(path).spawn();
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let result = Command::new("xdg-open").arg(path).spawn();

    match result {
        Ok(_) => {}
        Err(e) => warn!("Could not open image viewer: {e}"),
    }
}
