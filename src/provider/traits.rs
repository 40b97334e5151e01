use crate::model::{Period, PriceSeries, ProviderError};

#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch(&self, ticker: &str, period: Period) -> Result<PriceSeries, ProviderError>;
}
