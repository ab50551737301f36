use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketDataErrorKind {
    /// The provider does not know the symbol.
    NotFound,
    /// The provider answered with a non-success status.
    Upstream,
    /// The provider answered but the payload did not have the expected shape.
    Decode,
    /// The request never completed (connect, timeout, body read).
    Transport,
}

#[derive(Debug, Clone)]
pub struct MarketDataError {
    pub kind: MarketDataErrorKind,
    pub symbol: String,
    pub stage: &'static str,
    pub detail: String,
}

impl MarketDataError {
    pub fn new(
        kind: MarketDataErrorKind,
        symbol: impl Into<String>,
        stage: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            symbol: symbol.into(),
            stage,
            detail: detail.into(),
        }
    }

    /// Message safe to show to the person who typed the symbol.
    pub fn user_message(&self) -> String {
        match self.kind {
            MarketDataErrorKind::NotFound => format!("No data found for symbol {}", self.symbol),
            MarketDataErrorKind::Upstream | MarketDataErrorKind::Transport => format!(
                "Market data provider is unavailable for {} ({})",
                self.symbol, self.stage
            ),
            MarketDataErrorKind::Decode => format!(
                "Market data provider returned an unexpected response for {}",
                self.symbol
            ),
        }
    }
}

impl fmt::Display for MarketDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "market data error (kind={:?}, symbol={}, stage={}): {}",
            self.kind, self.symbol, self.stage, self.detail
        )
    }
}

impl std::error::Error for MarketDataError {}
