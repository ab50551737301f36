//! Six-axis fundamentals scoring used by the radar chart.
//!
//! Every axis lands in `[0, MAX_AXIS_SCORE]`. Missing inputs score 0, except Valuation: a
//! company with no usable P/E scores the maximum.

use crate::domain::fundamentals::FundamentalsRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_AXIS_SCORE: f64 = 5.0;

/// P/E at or above this value scores 0 on Valuation.
const PE_CEILING: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Valuation,
    Growth,
    Profitability,
    BalanceSheet,
    Dividends,
    Management,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::Valuation,
        Axis::Growth,
        Axis::Profitability,
        Axis::BalanceSheet,
        Axis::Dividends,
        Axis::Management,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Axis::Valuation => "Valuation",
            Axis::Growth => "Growth",
            Axis::Profitability => "Profitability",
            Axis::BalanceSheet => "Balance Sheet",
            Axis::Dividends => "Dividends",
            Axis::Management => "Management",
        }
    }

    /// Snake-case key used in query strings and CLI flags.
    pub fn key(self) -> &'static str {
        match self {
            Axis::Valuation => "valuation",
            Axis::Growth => "growth",
            Axis::Profitability => "profitability",
            Axis::BalanceSheet => "balance_sheet",
            Axis::Dividends => "dividends",
            Axis::Management => "management",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisScores {
    pub valuation: f64,
    pub growth: f64,
    pub profitability: f64,
    pub balance_sheet: f64,
    pub dividends: f64,
    pub management: f64,
}

impl AxisScores {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Valuation => self.valuation,
            Axis::Growth => self.growth,
            Axis::Profitability => self.profitability,
            Axis::BalanceSheet => self.balance_sheet,
            Axis::Dividends => self.dividends,
            Axis::Management => self.management,
        }
    }

    /// `(axis, score)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, f64)> + '_ {
        Axis::ALL.into_iter().map(move |a| (a, self.get(a)))
    }
}

/// Linear map of `value` from `[min, max]` onto `[0, 5]`, saturating at both ends.
/// A missing value scores 0.
pub fn scale(value: Option<f64>, min: f64, max: f64) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    let scaled = (value - min) / (max - min) * MAX_AXIS_SCORE;
    clamp_score(scaled)
}

// NaN collapses to 0 so the range holds for every input.
fn clamp_score(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, MAX_AXIS_SCORE)
}

/// Trailing P/E, falling back to forward P/E when trailing is missing or zero.
pub fn price_earnings(fundamentals: &FundamentalsRecord) -> Option<f64> {
    fundamentals
        .number("trailingPE")
        .filter(|pe| *pe != 0.0)
        .or_else(|| fundamentals.number("forwardPE"))
}

pub fn valuation_score(pe: Option<f64>) -> f64 {
    match pe {
        None => MAX_AXIS_SCORE,
        Some(pe) => clamp_score((PE_CEILING - pe) / PE_CEILING * MAX_AXIS_SCORE),
    }
}

/// Leverage transform applied before scaling: `1 / (de + 1)`, or 0 when debt-to-equity is
/// missing.
pub fn balance_sheet_ratio(debt_to_equity: Option<f64>) -> f64 {
    match debt_to_equity {
        Some(de) => 1.0 / (de + 1.0),
        None => 0.0,
    }
}

pub fn normalize(fundamentals: &FundamentalsRecord) -> AxisScores {
    let balance = balance_sheet_ratio(fundamentals.number("debtToEquity"));

    AxisScores {
        valuation: valuation_score(price_earnings(fundamentals)),
        growth: scale(fundamentals.number("revenueGrowth"), 0.0, 0.5),
        profitability: scale(fundamentals.number("profitMargins"), 0.0, 0.5),
        balance_sheet: scale(Some(balance), 0.0, 1.0),
        dividends: scale(fundamentals.number("dividendYield"), 0.0, 0.1),
        management: scale(fundamentals.number("returnOnEquity"), 0.0, 0.5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: serde_json::Value) -> FundamentalsRecord {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn all_missing_scores_zero_except_valuation() {
        let scores = normalize(&FundamentalsRecord::default());
        assert_eq!(scores.valuation, 5.0);
        assert_eq!(scores.growth, 0.0);
        assert_eq!(scores.profitability, 0.0);
        assert_eq!(scores.balance_sheet, 0.0);
        assert_eq!(scores.dividends, 0.0);
        assert_eq!(scores.management, 0.0);
    }

    #[test]
    fn typical_large_cap() {
        let scores = normalize(&record(json!({
            "trailingPE": 25.0,
            "revenueGrowth": 0.25,
            "profitMargins": 0.5,
            "debtToEquity": 1.0,
            "dividendYield": 0.02,
            "returnOnEquity": 0.75,
        })));
        assert_eq!(scores.valuation, 2.5);
        assert_eq!(scores.growth, 2.5);
        assert_eq!(scores.profitability, 5.0);
        assert_eq!(scores.balance_sheet, 2.5);
        assert!((scores.dividends - 1.0).abs() < 1e-12);
        assert_eq!(scores.management, 5.0);
    }

    #[test]
    fn trailing_pe_falls_back_to_forward() {
        let r = record(json!({"forwardPE": 40.0}));
        assert_eq!(price_earnings(&r), Some(40.0));
        assert!((normalize(&r).valuation - 1.0).abs() < 1e-12);

        let zero_trailing = record(json!({"trailingPE": 0.0, "forwardPE": 10.0}));
        assert_eq!(price_earnings(&zero_trailing), Some(10.0));
    }

    #[test]
    fn valuation_saturates_outside_range() {
        assert_eq!(valuation_score(Some(-12.0)), 5.0);
        assert_eq!(valuation_score(Some(0.0)), 5.0);
        assert_eq!(valuation_score(Some(50.0)), 0.0);
        assert_eq!(valuation_score(Some(400.0)), 0.0);
    }

    #[test]
    fn balance_sheet_boundaries() {
        assert_eq!(balance_sheet_ratio(Some(0.0)), 1.0);
        assert_eq!(balance_sheet_ratio(None), 0.0);
        assert_eq!(balance_sheet_ratio(Some(3.0)), 0.25);

        let debt_free = normalize(&record(json!({"debtToEquity": 0.0})));
        assert_eq!(debt_free.balance_sheet, 5.0);
    }

    #[test]
    fn pathological_leverage_stays_in_range() {
        for de in [-1.0, -0.5, -3.0, 1e9] {
            let scores = normalize(&record(json!({"debtToEquity": de})));
            assert!((0.0..=5.0).contains(&scores.balance_sheet), "de={de}");
        }
    }

    #[test]
    fn scale_saturates() {
        assert_eq!(scale(Some(0.5), 0.0, 0.5), 5.0);
        assert_eq!(scale(Some(3.0), 0.0, 0.5), 5.0);
        assert_eq!(scale(Some(0.0), 0.0, 0.5), 0.0);
        assert_eq!(scale(Some(-1.0), 0.0, 0.5), 0.0);
        assert_eq!(scale(None, 0.0, 0.5), 0.0);
    }

    #[test]
    fn iter_follows_display_order() {
        let scores = normalize(&FundamentalsRecord::default());
        let labels: Vec<_> = scores.iter().map(|(a, _)| a.label()).collect();
        assert_eq!(
            labels,
            [
                "Valuation",
                "Growth",
                "Profitability",
                "Balance Sheet",
                "Dividends",
                "Management"
            ]
        );
    }
}
