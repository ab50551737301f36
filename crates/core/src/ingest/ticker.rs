use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_TICKER_LEN: usize = 16;

/// An uppercased, validated ticker symbol (`MSFT`, `BRK-B`, `^GSPC`, `EURUSD=X`, `SAN.PA`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        let symbol = input.trim().to_ascii_uppercase();
        ensure!(!symbol.is_empty(), "ticker symbol must be non-empty");
        ensure!(
            symbol.len() <= MAX_TICKER_LEN,
            "ticker symbol must be at most {MAX_TICKER_LEN} characters (got {})",
            symbol.len()
        );
        ensure!(
            symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')),
            "ticker symbol contains invalid characters: {symbol:?}"
        );
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = anyhow::Error;

    fn try_from(value: String) -> anyhow::Result<Self> {
        Ticker::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(t: Ticker) -> Self {
        t.0
    }
}
