use crate::domain::fundamentals::FundamentalsRecord;
use crate::domain::history::{Lookback, PriceHistory};
use crate::ingest::provider::MarketDataProvider;
use crate::ingest::ticker::Ticker;
use crate::scoring::axis::{self, AxisScores};
use crate::scoring::health::{HealthScoreSource, ScoreBar};
use crate::view::chart::{self, ChartSection, Figure};
use crate::view::format::{
    format_decimal, format_grouped_value, format_percent, or_not_available, round2,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const NO_HISTORY_NOTICE: &str = "No historical price data available.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricLine {
    pub label: String,
    pub value: String,
}

impl MetricLine {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyOverview {
    pub name: String,
    pub ticker: String,
    pub sector: String,
    pub industry: String,
    pub employees: String,
    pub website: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfileView {
    pub ticker: Ticker,
    pub provider: String,
    pub overview: CompanyOverview,
    pub key_metrics: Vec<MetricLine>,
    pub price_chart: ChartSection,
    pub volume_chart: Option<Figure>,
    pub axis_scores: AxisScores,
    pub radar_chart: Figure,
    pub health_scores: Vec<ScoreBar>,
    pub health_chart: Figure,
    pub ratios: Vec<MetricLine>,
}

/// One lookup: parse the symbol, fetch fundamentals and a year of history, build every section.
pub async fn render_company_profile(
    provider: &dyn MarketDataProvider,
    health: &dyn HealthScoreSource,
    raw_symbol: &str,
) -> Result<CompanyProfileView> {
    let ticker = Ticker::parse(raw_symbol)?;

    let fundamentals = provider.fetch_fundamentals(&ticker).await?;
    let history = provider.fetch_history(&ticker, Lookback::OneYear).await?;

    tracing::info!(
        symbol = %ticker,
        provider = provider.provider_name(),
        fields = fundamentals.len(),
        bars = history.len(),
        "rendering company profile"
    );

    let mut view = build_company_profile(&ticker, &fundamentals, &history, health);
    view.provider = provider.provider_name().to_string();
    Ok(view)
}

pub fn build_company_profile(
    ticker: &Ticker,
    fundamentals: &FundamentalsRecord,
    history: &PriceHistory,
    health: &dyn HealthScoreSource,
) -> CompanyProfileView {
    let overview = overview(ticker, fundamentals);

    let price_chart = match chart::price_figure(history) {
        Some(fig) => ChartSection::Figure(fig),
        None => ChartSection::Notice(NO_HISTORY_NOTICE.to_string()),
    };

    let axis_scores = axis::normalize(fundamentals);
    let radar_chart = chart::radar_figure(&axis_scores, &overview.name);

    let health_scores = health.health_scores(fundamentals).bars();
    let health_chart = chart::score_bars_figure(&health_scores);

    CompanyProfileView {
        ticker: ticker.clone(),
        provider: String::new(),
        key_metrics: key_metrics(fundamentals),
        price_chart,
        volume_chart: chart::volume_figure(history),
        axis_scores,
        radar_chart,
        health_scores,
        health_chart,
        ratios: ratios(fundamentals),
        overview,
    }
}

fn overview(ticker: &Ticker, f: &FundamentalsRecord) -> CompanyOverview {
    let text = |key: &str| or_not_available(f.text(key).map(str::to_string));
    CompanyOverview {
        name: f
            .text("shortName")
            .map(str::to_string)
            .unwrap_or_else(|| ticker.to_string()),
        ticker: ticker.to_string(),
        sector: text("sector"),
        industry: text("industry"),
        employees: or_not_available(f.integer("fullTimeEmployees").map(|n| n.to_string())),
        website: text("website"),
        summary: text("longBusinessSummary"),
    }
}

fn key_metrics(f: &FundamentalsRecord) -> Vec<MetricLine> {
    let grouped = |key: &str| or_not_available(f.get(key).and_then(format_grouped_value));
    vec![
        MetricLine::new("Market Cap", grouped("marketCap")),
        MetricLine::new("Current Price", grouped("currentPrice")),
        MetricLine::new("PE Ratio (TTM)", grouped("trailingPE")),
        MetricLine::new("Forward PE", grouped("forwardPE")),
        MetricLine::new(
            "Dividend Yield",
            or_not_available(f.number("dividendYield").map(format_percent)),
        ),
        MetricLine::new("Beta", grouped("beta")),
    ]
}

fn ratios(f: &FundamentalsRecord) -> Vec<MetricLine> {
    let two_places = |v: f64| format_decimal(round2(v));

    let ev_to_revenue = match (f.number("enterpriseValue"), f.number("totalRevenue")) {
        (Some(ev), Some(rev)) if rev != 0.0 => Some(ev / rev),
        _ => None,
    };

    vec![
        MetricLine::new(
            "PEG (5yr expected)",
            or_not_available(f.number("trailingPegRatio").map(format_decimal)),
        ),
        MetricLine::new(
            "RoE",
            or_not_available(f.number("returnOnEquity").map(|v| two_places(v * 100.0))),
        ),
        MetricLine::new(
            "DtE",
            or_not_available(f.number("debtToEquity").map(two_places)),
        ),
        MetricLine::new("EVOEG", or_not_available(ev_to_revenue.map(two_places))),
    ]
}
