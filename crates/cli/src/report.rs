//! Plain-text reports for the terminal.

use serde_json::Value;
use std::fmt::Write;

use stockdash_core::domain::fundamentals::FundamentalsRecord;
use stockdash_core::scoring::axis::{Axis, AxisScores};
use stockdash_core::scoring::health::ScoreBar;
use stockdash_core::screener::ScreenerRow;
use stockdash_core::view::format::{
    format_decimal, format_grouped_integer, format_grouped_value, NOT_AVAILABLE,
};

fn field(f: &FundamentalsRecord, key: &str) -> String {
    match f.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(format_decimal).unwrap_or_default(),
        },
        Some(other) => other.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn grouped(f: &FundamentalsRecord, key: &str) -> String {
    f.get(key)
        .and_then(format_grouped_value)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Sentences of a business summary, each ending in a single full stop.
pub fn summary_sentences(summary: &str) -> Vec<String> {
    summary
        .split(". ")
        .map(|s| s.trim().trim_end_matches('.'))
        .filter(|s| !s.is_empty())
        .map(|s| format!("{s}."))
        .collect()
}

pub fn company_report(f: &FundamentalsRecord) -> String {
    let mut out = String::new();
    let name = f
        .text("longName")
        .or_else(|| f.text("shortName"))
        .unwrap_or(NOT_AVAILABLE);

    let _ = writeln!(out, "=== Company Info ===");
    let _ = writeln!(out, "Name        : {name}");
    let _ = writeln!(out, "Ticker      : {}", field(f, "symbol"));
    let _ = writeln!(out, "Website     : {}", field(f, "website"));
    let _ = writeln!(out, "Industry    : {}", field(f, "industry"));
    let _ = writeln!(out, "Sector      : {}", field(f, "sector"));
    let _ = writeln!(
        out,
        "Headquarters: {}, {}, {} {}, {}",
        field(f, "address1"),
        field(f, "city"),
        field(f, "state"),
        field(f, "zip"),
        field(f, "country")
    );
    let _ = writeln!(out, "Phone       : {}", field(f, "phone"));
    out.push('\n');

    let _ = writeln!(out, "=== Key Metrics ===");
    let _ = writeln!(out, "Current Price         : {}", field(f, "currentPrice"));
    let _ = writeln!(out, "Previous Close        : {}", field(f, "previousClose"));
    let _ = writeln!(out, "Market Cap            : {}", grouped(f, "marketCap"));
    let _ = writeln!(out, "Beta                  : {}", field(f, "beta"));
    let _ = writeln!(
        out,
        "52 Week Range         : {} - {}",
        field(f, "fiftyTwoWeekLow"),
        field(f, "fiftyTwoWeekHigh")
    );
    let _ = writeln!(out, "Dividend Rate         : {}", field(f, "dividendRate"));
    let _ = writeln!(out, "Dividend Yield        : {}", field(f, "dividendYield"));
    let _ = writeln!(out, "P/E Ratio (Trailing)  : {}", field(f, "trailingPE"));
    let _ = writeln!(out, "P/E Ratio (Forward)   : {}", field(f, "forwardPE"));
    out.push('\n');

    let _ = writeln!(out, "=== Executive Team ===");
    for officer in f.officers() {
        let pay = officer
            .total_pay
            .map(|p| format!("${}", format_grouped_integer(p.round() as i64)))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let _ = writeln!(
            out,
            "- {} | {} | Total Pay: {pay}",
            officer.name,
            officer.title.as_deref().unwrap_or(NOT_AVAILABLE)
        );
    }
    out.push('\n');

    let _ = writeln!(out, "=== Business Summary ===");
    for sentence in summary_sentences(f.text("longBusinessSummary").unwrap_or_default()) {
        let _ = writeln!(out, "- {sentence}");
    }
    out
}

pub fn scores_report(symbol: &str, scores: &AxisScores, bars: &[ScoreBar]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Fundamental Scores ({symbol}) ===");
    for (axis, score) in scores.iter() {
        let _ = writeln!(out, "{:<14}: {score:.2} / 5", axis.label());
    }
    out.push('\n');
    let _ = writeln!(out, "=== Financial Health ===");
    for bar in bars {
        let _ = writeln!(
            out,
            "{:<18}: {:<6} {}",
            bar.label,
            bar.text,
            meter(bar.normalized)
        );
    }
    out
}

fn meter(unit: f64) -> String {
    const WIDTH: usize = 20;
    let filled = (unit.clamp(0.0, 1.0) * WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(WIDTH - filled))
}

pub fn screener_table(rows: &[ScreenerRow], notice: Option<&str>) -> String {
    if let Some(notice) = notice {
        return format!("{notice}\n");
    }

    let mut out = String::new();
    let _ = write!(out, "{:<12}", "Company");
    for axis in Axis::ALL {
        let _ = write!(out, "{:>15}", axis.label());
    }
    out.push('\n');
    for row in rows {
        let _ = write!(out, "{:<12}", row.company);
        for axis in Axis::ALL {
            let _ = write!(out, "{:>15}", row.rating(axis));
        }
        out.push('\n');
    }
    out
}
