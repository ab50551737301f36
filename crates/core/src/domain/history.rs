use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookback {
    OneMonth,
    SixMonths,
    #[default]
    OneYear,
    FiveYears,
}

impl Lookback {
    /// Range token understood by the chart endpoint.
    pub fn as_range(self) -> &'static str {
        match self {
            Lookback::OneMonth => "1mo",
            Lookback::SixMonths => "6mo",
            Lookback::OneYear => "1y",
            Lookback::FiveYears => "5y",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<u64>,
}

/// Daily bars in ascending date order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub bars: Vec<PriceBar>,
}

impl PriceHistory {
    pub fn new(mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        Self { bars }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<u64> {
        self.bars.iter().map(|b| b.volume.unwrap_or(0)).collect()
    }

    /// Trailing simple moving average of the close. `None` until `window` bars are available.
    pub fn moving_average(&self, window: usize) -> Vec<Option<f64>> {
        rolling_mean(&self.closes(), window)
    }
}

pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}
