use crate::config::Settings;
use crate::domain::fundamentals::FundamentalsRecord;
use crate::domain::history::{Lookback, PriceBar, PriceHistory};
use crate::ingest::error::{MarketDataError, MarketDataErrorKind};
use crate::ingest::provider::MarketDataProvider;
use crate::ingest::ticker::Ticker;
use crate::ingest::types::{ChartResponse, ProviderErrorBody, QuoteSummaryResponse};
use anyhow::{Context, Result};
use chrono::DateTime;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, USER_AGENT};
use reqwest::StatusCode;
use serde_json::{Map, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 1;
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; stockdash/0.1)";

/// Modules requested from the quote summary endpoint. Earlier modules win when two of them
/// carry the same field.
const QUOTE_SUMMARY_MODULES: [&str; 6] = [
    "price",
    "summaryDetail",
    "financialData",
    "defaultKeyStatistics",
    "assetProfile",
    "summaryProfile",
];

#[derive(Debug, Clone)]
pub struct YahooClient {
    http: reqwest::Client,
    base_url: String,
    crumb: Option<String>,
    cookie: Option<String>,
    user_agent: String,
    retries: u32,
}

impl YahooClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings
            .market_data_base_url
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = settings
            .market_data_timeout_secs()?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let retries = settings.market_data_retries()?.unwrap_or(DEFAULT_RETRIES);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url,
            crumb: settings.market_data_crumb.clone(),
            cookie: settings.market_data_cookie.clone(),
            user_agent: settings
                .market_data_user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            retries,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.user_agent)?);
        if let Some(cookie) = &self.cookie {
            headers.insert(COOKIE, HeaderValue::from_str(cookie)?);
        }
        Ok(headers)
    }

    async fn get_once(
        &self,
        symbol: &str,
        stage: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value> {
        let mut query = query.to_vec();
        if let Some(crumb) = &self.crumb {
            query.push(("crumb", crumb.clone()));
        }

        let res = self
            .http
            .get(self.url(path))
            .headers(self.headers()?)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                MarketDataError::new(MarketDataErrorKind::Transport, symbol, stage, e.to_string())
            })?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            MarketDataError::new(MarketDataErrorKind::Transport, symbol, stage, e.to_string())
        })?;

        // Unknown symbols come back as 404 with a JSON error envelope; let the parser classify
        // those. Anything else that is not JSON is an upstream failure.
        match serde_json::from_str::<Value>(&text) {
            Ok(raw) if status.is_success() || status == StatusCode::NOT_FOUND => Ok(raw),
            Ok(raw) => Err(MarketDataError::new(
                MarketDataErrorKind::Upstream,
                symbol,
                stage,
                format!("HTTP {status}: {raw}"),
            )
            .into()),
            Err(_) if !status.is_success() => Err(MarketDataError::new(
                if status == StatusCode::NOT_FOUND {
                    MarketDataErrorKind::NotFound
                } else {
                    MarketDataErrorKind::Upstream
                },
                symbol,
                stage,
                format!("HTTP {status}"),
            )
            .into()),
            Err(e) => Err(MarketDataError::new(
                MarketDataErrorKind::Decode,
                symbol,
                stage,
                format!("response is not valid JSON: {e}"),
            )
            .into()),
        }
    }

    async fn get_json(
        &self,
        symbol: &str,
        stage: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value> {
        let attempts = self.retries.max(1);
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.get_once(symbol, stage, path, query).await {
                Ok(raw) => return Ok(raw),
                Err(err) => {
                    if attempt >= attempts || !is_retryable(&err) {
                        return Err(err);
                    }
                    let backoff = retry_backoff(attempt);
                    tracing::warn!(attempt, ?backoff, %symbol, stage, error = %err, "market data fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

/// Delay after failed attempt `attempt` (1-based): 1s, 2s, 4s, capped at 64s.
fn retry_backoff(attempt: u32) -> Duration {
    Duration::from_secs(1 << attempt.saturating_sub(1).min(6))
}

fn is_retryable(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<MarketDataError>() {
        Some(e) => matches!(
            e.kind,
            MarketDataErrorKind::Transport | MarketDataErrorKind::Upstream
        ),
        None => false,
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooClient {
    fn provider_name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_fundamentals(&self, ticker: &Ticker) -> Result<FundamentalsRecord> {
        let path = format!("/v10/finance/quoteSummary/{}", ticker.as_str());
        let raw = self
            .get_json(
                ticker.as_str(),
                "quote_summary",
                &path,
                &[("modules", QUOTE_SUMMARY_MODULES.join(","))],
            )
            .await?;
        let record = parse_quote_summary(ticker.as_str(), raw)?;
        tracing::debug!(symbol = %ticker, fields = record.len(), "fetched fundamentals");
        Ok(record)
    }

    async fn fetch_history(&self, ticker: &Ticker, lookback: Lookback) -> Result<PriceHistory> {
        let path = format!("/v8/finance/chart/{}", ticker.as_str());
        let raw = self
            .get_json(
                ticker.as_str(),
                "chart",
                &path,
                &[
                    ("range", lookback.as_range().to_string()),
                    ("interval", "1d".to_string()),
                ],
            )
            .await?;
        let history = parse_chart(ticker.as_str(), raw)?;
        tracing::debug!(symbol = %ticker, bars = history.len(), "fetched price history");
        Ok(history)
    }
}

fn classify(symbol: &str, stage: &'static str, body: &ProviderErrorBody) -> MarketDataError {
    let code = body.code.as_deref().unwrap_or("unknown");
    let kind = if code.eq_ignore_ascii_case("Not Found") {
        MarketDataErrorKind::NotFound
    } else {
        MarketDataErrorKind::Upstream
    };
    MarketDataError::new(
        kind,
        symbol,
        stage,
        format!(
            "{code}: {}",
            body.description.as_deref().unwrap_or("no description")
        ),
    )
}

/// Flattens a quote summary payload into one field map, unwrapping `{"raw": .., "fmt": ..}`
/// numbers and dropping empty placeholders.
pub fn parse_quote_summary(
    symbol: &str,
    raw: Value,
) -> std::result::Result<FundamentalsRecord, MarketDataError> {
    const STAGE: &str = "quote_summary";

    let parsed = serde_json::from_value::<QuoteSummaryResponse>(raw).map_err(|e| {
        MarketDataError::new(MarketDataErrorKind::Decode, symbol, STAGE, e.to_string())
    })?;

    if let Some(err) = &parsed.quote_summary.error {
        return Err(classify(symbol, STAGE, err));
    }

    let modules = parsed
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| {
            MarketDataError::new(MarketDataErrorKind::NotFound, symbol, STAGE, "empty result")
        })?;

    let mut record = FundamentalsRecord::default();
    let mut seen = std::collections::BTreeSet::new();
    let ordered = QUOTE_SUMMARY_MODULES
        .iter()
        .filter_map(|name| modules.get(*name))
        .chain(
            modules
                .iter()
                .filter(|(name, _)| !QUOTE_SUMMARY_MODULES.contains(&name.as_str()))
                .map(|(_, v)| v),
        );

    for module in ordered {
        let Value::Object(fields) = module else {
            continue;
        };
        for (key, value) in fields {
            if key == "maxAge" || seen.contains(key) {
                continue;
            }
            if let Some(v) = unwrap_value(value) {
                seen.insert(key.clone());
                record.insert(key.clone(), v);
            }
        }
    }

    if record.get("trailingPegRatio").is_none() {
        if let Some(peg) = record.get("pegRatio").cloned() {
            record.insert("trailingPegRatio", peg);
        }
    }

    if record.is_empty() {
        return Err(MarketDataError::new(
            MarketDataErrorKind::NotFound,
            symbol,
            STAGE,
            "no fields in result",
        ));
    }

    Ok(record)
}

fn unwrap_value(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        Value::Object(map) if map.contains_key("raw") => map.get("raw").cloned(),
        Value::Object(map) => Some(Value::Object(unwrap_object(map))),
        Value::Array(items) => Some(Value::Array(
            items.iter().filter_map(unwrap_value).collect(),
        )),
        other => Some(other.clone()),
    }
}

fn unwrap_object(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter_map(|(k, v)| unwrap_value(v).map(|v| (k.clone(), v)))
        .collect()
}

/// Converts a chart payload into daily bars. Bars without a close are skipped; a result with no
/// timestamps is an empty (not failed) history.
pub fn parse_chart(
    symbol: &str,
    raw: Value,
) -> std::result::Result<PriceHistory, MarketDataError> {
    const STAGE: &str = "chart";

    let parsed = serde_json::from_value::<ChartResponse>(raw).map_err(|e| {
        MarketDataError::new(MarketDataErrorKind::Decode, symbol, STAGE, e.to_string())
    })?;

    if let Some(err) = &parsed.chart.error {
        return Err(classify(symbol, STAGE, err));
    }

    let Some(result) = parsed.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceHistory::default());
    };

    let offset = result.meta.as_ref().and_then(|m| m.gmtoffset).unwrap_or(0);
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let at = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let Some(close) = at(&quote.close[..], i).filter(|c| c.is_finite()) else {
            continue;
        };
        let Some(dt) = DateTime::from_timestamp(ts + offset, 0) else {
            continue;
        };
        bars.push(PriceBar {
            date: dt.date_naive(),
            open: at(&quote.open[..], i),
            high: at(&quote.high[..], i),
            low: at(&quote.low[..], i),
            close,
            volume: at(&quote.volume[..], i)
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v.round() as u64),
        });
    }

    Ok(PriceHistory::new(bars))
}
