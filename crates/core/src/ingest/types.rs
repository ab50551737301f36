use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderErrorBody {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummaryResponse {
    pub quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSummaryEnvelope {
    pub result: Option<Vec<Map<String, Value>>>,
    pub error: Option<ProviderErrorBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartEnvelope {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ProviderErrorBody>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResult {
    pub meta: Option<ChartMeta>,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub currency: Option<String>,
    /// Exchange offset from UTC in seconds; shifts bar timestamps onto the exchange's calendar.
    pub gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

/// Column-oriented OHLCV arrays aligned with `ChartResult::timestamp`. Gaps are `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartQuote {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<f64>>,
}
