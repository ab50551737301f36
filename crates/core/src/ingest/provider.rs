use crate::domain::fundamentals::FundamentalsRecord;
use crate::domain::history::{Lookback, PriceHistory};
use crate::ingest::ticker::Ticker;
use anyhow::Result;

/// External source of per-ticker company data.
///
/// Implementations fetch fresh on every call; nothing is cached between lookups. Failures
/// should carry a [`MarketDataError`](crate::ingest::error::MarketDataError) so callers can
/// tell an unknown symbol from an unavailable provider.
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_fundamentals(&self, ticker: &Ticker) -> Result<FundamentalsRecord>;

    async fn fetch_history(&self, ticker: &Ticker, lookback: Lookback) -> Result<PriceHistory>;
}
