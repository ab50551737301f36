use crate::scoring::axis::Axis;
use anyhow::ensure;
use serde::{Deserialize, Serialize};

pub const MAX_RATING: u8 = 5;

pub const COUNTRIES: [&str; 4] = ["France", "USA", "Germany", "UK"];
pub const SECTORS: [&str; 4] = ["Tech", "Finance", "Healthcare", "Energy"];
pub const MARKET_CAPS: [&str; 3] = ["Small Cap", "Mid Cap", "Large Cap"];

pub const NO_MATCHES_NOTICE: &str = "No companies match your criteria.";
pub const ADVANCED_FILTERS_MESSAGE: &str = "Advanced filters activated!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenerRow {
    pub company: String,
    pub valuation: u8,
    pub growth: u8,
    pub profitability: u8,
    pub balance_sheet: u8,
    pub dividends: u8,
    pub management: u8,
}

impl ScreenerRow {
    pub fn rating(&self, axis: Axis) -> u8 {
        match axis {
            Axis::Valuation => self.valuation,
            Axis::Growth => self.growth,
            Axis::Profitability => self.profitability,
            Axis::BalanceSheet => self.balance_sheet,
            Axis::Dividends => self.dividends,
            Axis::Management => self.management,
        }
    }
}

fn row(company: &str, r: [u8; 6]) -> ScreenerRow {
    ScreenerRow {
        company: company.to_string(),
        valuation: r[0],
        growth: r[1],
        profitability: r[2],
        balance_sheet: r[3],
        dividends: r[4],
        management: r[5],
    }
}

/// The fixed seven-company table the screener browses.
pub fn sample_dataset() -> Vec<ScreenerRow> {
    vec![
        row("Apple", [4, 5, 5, 4, 3, 5]),
        row("Microsoft", [4, 4, 5, 5, 3, 5]),
        row("Tesla", [3, 5, 2, 3, 0, 4]),
        row("Coca-Cola", [3, 2, 4, 4, 5, 4]),
        row("Amazon", [2, 5, 3, 3, 0, 4]),
        row("Nvidia", [3, 5, 4, 4, 1, 4]),
        row("JPMorgan", [4, 3, 4, 5, 4, 4]),
    ]
}

/// Minimum rating per axis. 0 means no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisThresholds {
    pub valuation: u8,
    pub growth: u8,
    pub profitability: u8,
    pub balance_sheet: u8,
    pub dividends: u8,
    pub management: u8,
}

impl AxisThresholds {
    pub fn get(&self, axis: Axis) -> u8 {
        match axis {
            Axis::Valuation => self.valuation,
            Axis::Growth => self.growth,
            Axis::Profitability => self.profitability,
            Axis::BalanceSheet => self.balance_sheet,
            Axis::Dividends => self.dividends,
            Axis::Management => self.management,
        }
    }

    pub fn set(&mut self, axis: Axis, value: u8) -> anyhow::Result<()> {
        ensure!(
            value <= MAX_RATING,
            "{} threshold must be 0..={MAX_RATING} (got {value})",
            axis.label()
        );
        let slot = match axis {
            Axis::Valuation => &mut self.valuation,
            Axis::Growth => &mut self.growth,
            Axis::Profitability => &mut self.profitability,
            Axis::BalanceSheet => &mut self.balance_sheet,
            Axis::Dividends => &mut self.dividends,
            Axis::Management => &mut self.management,
        };
        *slot = value;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for axis in Axis::ALL {
            let v = self.get(axis);
            ensure!(
                v <= MAX_RATING,
                "{} threshold must be 0..={MAX_RATING} (got {v})",
                axis.label()
            );
        }
        Ok(())
    }

    pub fn matches(&self, row: &ScreenerRow) -> bool {
        Axis::ALL.into_iter().all(|axis| {
            let min = self.get(axis);
            min == 0 || row.rating(axis) >= min
        })
    }
}

/// Rows meeting every non-zero threshold, in dataset order.
pub fn filter(rows: &[ScreenerRow], thresholds: &AxisThresholds) -> Vec<ScreenerRow> {
    rows.iter()
        .filter(|r| thresholds.matches(r))
        .cloned()
        .collect()
}

/// Selections held for one user's screener session.
///
/// Defaults: every threshold 0, and the first option of each cosmetic selector. The cosmetic
/// selections are echoed back but never filter anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerSession {
    pub thresholds: AxisThresholds,
    pub country: String,
    pub sector: String,
    pub market_cap: String,
}

impl Default for ScreenerSession {
    fn default() -> Self {
        Self {
            thresholds: AxisThresholds::default(),
            country: COUNTRIES[0].to_string(),
            sector: SECTORS[0].to_string(),
            market_cap: MARKET_CAPS[0].to_string(),
        }
    }
}

impl ScreenerSession {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.thresholds.validate()?;
        ensure_option("country", &self.country, &COUNTRIES)?;
        ensure_option("sector", &self.sector, &SECTORS)?;
        ensure_option("market_cap", &self.market_cap, &MARKET_CAPS)?;
        Ok(())
    }

    pub fn matching_rows(&self, rows: &[ScreenerRow]) -> Vec<ScreenerRow> {
        filter(rows, &self.thresholds)
    }
}

fn ensure_option(field: &str, value: &str, options: &[&str]) -> anyhow::Result<()> {
    ensure!(
        options.contains(&value),
        "{field} must be one of {options:?} (got {value:?})"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn companies(rows: &[ScreenerRow]) -> Vec<&str> {
        rows.iter().map(|r| r.company.as_str()).collect()
    }

    #[test]
    fn zero_thresholds_return_everything_in_order() {
        let data = sample_dataset();
        let out = filter(&data, &AxisThresholds::default());
        assert_eq!(out, data);
    }

    #[test]
    fn valuation_five_matches_only_top_rated_valuations() {
        let data = sample_dataset();
        let t = AxisThresholds {
            valuation: 5,
            ..Default::default()
        };
        let out = filter(&data, &t);
        assert!(out.iter().all(|r| r.valuation == 5));
        assert_eq!(
            out.len(),
            data.iter().filter(|r| r.valuation == 5).count()
        );
        assert!(out.is_empty());
    }

    #[test]
    fn profitability_five_is_apple_and_microsoft() {
        let t = AxisThresholds {
            profitability: 5,
            ..Default::default()
        };
        assert_eq!(companies(&filter(&sample_dataset(), &t)), ["Apple", "Microsoft"]);
    }

    #[test]
    fn thresholds_combine() {
        let t = AxisThresholds {
            growth: 5,
            dividends: 1,
            ..Default::default()
        };
        assert_eq!(companies(&filter(&sample_dataset(), &t)), ["Apple", "Nvidia"]);
    }

    #[test]
    fn set_rejects_out_of_range() {
        let mut t = AxisThresholds::default();
        assert!(t.set(Axis::Dividends, 6).is_err());
        t.set(Axis::Dividends, 4).unwrap();
        assert_eq!(t.dividends, 4);
    }

    #[test]
    fn session_defaults() {
        let s = ScreenerSession::default();
        assert_eq!(s.thresholds, AxisThresholds::default());
        assert_eq!(s.country, "France");
        assert_eq!(s.sector, "Tech");
        assert_eq!(s.market_cap, "Small Cap");
        s.validate().unwrap();
    }

    #[test]
    fn session_rejects_unknown_country() {
        let s = ScreenerSession {
            country: "Atlantis".to_string(),
            ..Default::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn session_deserializes_with_partial_fields() {
        let s: ScreenerSession = serde_json::from_value(serde_json::json!({
            "thresholds": {"valuation": 3, "management": 4},
            "sector": "Finance",
        }))
        .unwrap();
        assert_eq!(s.thresholds.valuation, 3);
        assert_eq!(s.thresholds.management, 4);
        assert_eq!(s.sector, "Finance");
        assert_eq!(s.country, "France");
    }
}
