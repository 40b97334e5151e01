use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::model::{Period, PriceBar, PriceSeries, ProviderError};
use crate::provider::traits::QuoteProvider;

/// Fetches daily history from the Yahoo Finance v8 chart endpoint.
pub struct YahooProvider {
    pub client: Client,
    base_url: String,
}

/// Response envelope of the chart endpoint. Rows with missing OHLC
/// values (halted sessions) are dropped during conversion.
#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<QuoteColumns>,
    adjclose: Option<Vec<AdjCloseColumn>>,
}

#[derive(Debug, Deserialize)]
struct QuoteColumns {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseColumn {
    adjclose: Vec<Option<f64>>,
}

impl YahooProvider {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) crosswatch/0.1")
            .build()
            .unwrap();

        Self {
            client,
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
        }
    }

    fn build_url(&self, ticker: &str, period: Period) -> String {
        format!(
            "{}/{}?range={}&interval=1d",
            self.base_url,
            ticker,
            period.as_str()
        )
    }

    fn parse_chart(
        &self,
        ticker: &str,
        period: Period,
        body: &str,
    ) -> Result<PriceSeries, ProviderError> {
        let envelope: ChartEnvelope =
            serde_json::from_str(body).map_err(|e| ProviderError::Parse {
                ticker: ticker.to_string(),
                message: e.to_string(),
            })?;

        if let Some(err) = envelope.chart.error {
            return Err(ProviderError::Api {
                ticker: ticker.to_string(),
                code: err.code,
                description: err.description,
            });
        }

        let no_data = || ProviderError::NoData {
            ticker: ticker.to_string(),
            period: period.as_str().to_string(),
        };

        let result = envelope
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(no_data)?;
        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(no_data)?;
        let adjclose = result
            .indicators
            .adjclose
            .and_then(|a| a.into_iter().next());

        let mut bars = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();
            let adj_close = adjclose
                .as_ref()
                .and_then(|a| a.adjclose.get(i).copied().flatten());

            let (Some(open), Some(high), Some(low), Some(close), Some(volume)) =
                (open, high, low, close, volume)
            else {
                continue;
            };
            let Some(timestamp) = DateTime::from_timestamp(ts, 0) else {
                continue;
            };

            bars.push(PriceBar {
                timestamp,
                open,
                high,
                low,
                close,
                adj_close: adj_close.unwrap_or(close),
                volume,
            });
        }

        // Strictly increasing timestamps, no duplicate dates.
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);

        if bars.is_empty() {
            return Err(no_data());
        }

        Ok(PriceSeries {
            symbol: ticker.to_string(),
            bars,
        })
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl QuoteProvider for YahooProvider {
    async fn fetch(&self, ticker: &str, period: Period) -> Result<PriceSeries, ProviderError> {
        let url = self.build_url(ticker, period);
        debug!("Requesting {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Http {
                ticker: ticker.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ProviderError::Http {
            ticker: ticker.to_string(),
            message: e.to_string(),
        })?;

        // Symbol errors come back as a JSON error envelope even on 4xx,
        // so parse first and fall back to the bare status code.
        match self.parse_chart(ticker, period, &body) {
            Err(ProviderError::Parse { .. }) if !status.is_success() => {
                Err(ProviderError::Http {
                    ticker: ticker.to_string(),
                    message: format!("HTTP {status}"),
                })
            }
            other => other,
        }
    }
}
