use crate::scoring::axis::Axis;
use crate::screener::{
    sample_dataset, ScreenerRow, ScreenerSession, ADVANCED_FILTERS_MESSAGE, COUNTRIES,
    MARKET_CAPS, MAX_RATING, NO_MATCHES_NOTICE, SECTORS,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSelector {
    pub key: String,
    pub label: String,
    pub options: Vec<u8>,
    pub selected: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceSelector {
    pub key: String,
    pub label: String,
    pub options: Vec<String>,
    pub selected: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerView {
    pub session: ScreenerSession,
    pub ratings: Vec<RatingSelector>,
    pub filters: Vec<ChoiceSelector>,
    pub rows: Vec<ScreenerRow>,
    /// Set when no row survives the filter.
    pub notice: Option<String>,
    /// Confirmation shown after the advanced-filters action.
    pub message: Option<String>,
}

pub fn render_screener(session: &ScreenerSession) -> ScreenerView {
    let rows = session.matching_rows(&sample_dataset());
    let notice = rows.is_empty().then(|| NO_MATCHES_NOTICE.to_string());

    tracing::debug!(
        thresholds = ?session.thresholds,
        matches = rows.len(),
        "rendering screener"
    );

    ScreenerView {
        ratings: Axis::ALL
            .into_iter()
            .map(|axis| RatingSelector {
                key: axis.key().to_string(),
                label: axis.label().to_string(),
                options: (0..=MAX_RATING).collect(),
                selected: session.thresholds.get(axis),
            })
            .collect(),
        filters: vec![
            choice("country", "Country", &COUNTRIES, &session.country),
            choice("sector", "Sector", &SECTORS, &session.sector),
            choice("market_cap", "Market Cap", &MARKET_CAPS, &session.market_cap),
        ],
        session: session.clone(),
        rows,
        notice,
        message: None,
    }
}

/// The advanced-filters button only confirms; the table is unchanged.
pub fn activate_advanced_filters(session: &ScreenerSession) -> ScreenerView {
    let mut view = render_screener(session);
    view.message = Some(ADVANCED_FILTERS_MESSAGE.to_string());
    view
}

fn choice(key: &str, label: &str, options: &[&str], selected: &str) -> ChoiceSelector {
    ChoiceSelector {
        key: key.to_string(),
        label: label.to_string(),
        options: options.iter().map(|s| s.to_string()).collect(),
        selected: selected.to_string(),
    }
}
