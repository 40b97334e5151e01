// Core structs: PriceBar, PriceSeries, IndicatorSeries, Crossover
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// A single daily OHLCV bar, vendor-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
}

/// Ordered price history for one symbol. Timestamps are strictly
/// increasing with no duplicates; the provider enforces this on
/// construction.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }
}

/// Derived columns, index-aligned with the source series.
/// `ma_short` and `ma_long` are defined from the first index onward
/// (shrinking window); `daily_return[0]` is `None`.
#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub ma_short: Vec<f64>,
    pub ma_long: Vec<f64>,
    pub daily_return: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverKind {
    Bullish,
    Bearish,
}

/// A point where the short MA crossed the long MA.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossover {
    pub timestamp: DateTime<Utc>,
    pub kind: CrossoverKind,
}

/// History range accepted by the chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1mo" => Ok(Period::OneMonth),
            "3mo" => Ok(Period::ThreeMonths),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            "2y" => Ok(Period::TwoYears),
            "5y" => Ok(Period::FiveYears),
            "10y" => Ok(Period::TenYears),
            "ytd" => Ok(Period::YearToDate),
            "max" => Ok(Period::Max),
            other => Err(format!(
                "unknown period '{other}' (expected one of: 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)"
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to download data for {ticker}: {message}")]
    Http { ticker: String, message: String },

    #[error("failed to download data for {ticker}: [{code}] {description}")]
    Api {
        ticker: String,
        code: String,
        description: String,
    },

    #[error("failed to parse response for {ticker}: {message}")]
    Parse { ticker: String, message: String },

    #[error("no data found for ticker '{ticker}' with period='{period}'")]
    NoData { ticker: String, period: String },
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid CSV row: {0}")]
    CsvRow(String),

    #[error("chart rendering failed: {0}")]
    Render(String),
}
