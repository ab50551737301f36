//! Plotly-compatible figure descriptions. The browser hands `data` and `layout` straight to
//! `Plotly.newPlot`.

use crate::domain::history::PriceHistory;
use crate::scoring::axis::{AxisScores, MAX_AXIS_SCORE};
use crate::scoring::health::ScoreBar;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const SHORT_MA_WINDOW: usize = 50;
pub const LONG_MA_WINDOW: usize = 200;

const TEMPLATE: &str = "plotly_white";
const RADAR_LINE_COLOR: &str = "rgba(102, 126, 234, 0.8)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
}

/// A chart slot that either holds a figure or explains why there is none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ChartSection {
    Figure(Figure),
    Notice(String),
}

/// Closed polygon over the six axes: the first vertex is repeated at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarPolygon {
    pub theta: Vec<String>,
    pub r: Vec<f64>,
}

impl RadarPolygon {
    pub fn from_scores(scores: &AxisScores) -> Self {
        let mut theta: Vec<String> = Vec::with_capacity(7);
        let mut r = Vec::with_capacity(7);
        for (axis, score) in scores.iter() {
            theta.push(axis.label().to_string());
            r.push(score);
        }
        if let (Some(t), Some(v)) = (theta.first().cloned(), r.first().copied()) {
            theta.push(t);
            r.push(v);
        }
        Self { theta, r }
    }
}

pub fn radar_figure(scores: &AxisScores, company: &str) -> Figure {
    let polygon = RadarPolygon::from_scores(scores);
    Figure {
        data: vec![json!({
            "type": "scatterpolar",
            "r": polygon.r,
            "theta": polygon.theta,
            "fill": "toself",
            "name": company,
            "line": {"color": RADAR_LINE_COLOR, "width": 2},
        })],
        layout: json!({
            "polar": {"radialaxis": {"visible": true, "range": [0.0, MAX_AXIS_SCORE]}},
            "showlegend": false,
            "template": TEMPLATE,
            "title": {"text": format!("Fundamental Metrics Radar for {company}")},
        }),
    }
}

pub fn score_bars_figure(bars: &[ScoreBar]) -> Figure {
    let data = bars
        .iter()
        .map(|bar| {
            json!({
                "type": "bar",
                "orientation": "h",
                "y": [bar.label],
                "x": [bar.normalized],
                "text": bar.text,
                "textposition": "inside",
                "marker": {"color": bar.color},
                "width": 0.5,
                "showlegend": false,
            })
        })
        .collect();

    Figure {
        data,
        layout: json!({
            "xaxis": {"showticklabels": false, "showgrid": false, "range": [0.0, 1.0]},
            "yaxis": {"autorange": "reversed"},
            "template": TEMPLATE,
            "height": 200 + 50 * bars.len(),
        }),
    }
}

/// Close price with 50- and 200-day moving averages. `None` when there are no bars.
pub fn price_figure(history: &PriceHistory) -> Option<Figure> {
    if history.is_empty() {
        return None;
    }
    let dates = history.dates();

    Some(Figure {
        data: vec![
            json!({
                "type": "scatter",
                "mode": "lines",
                "name": "Close",
                "x": dates,
                "y": history.closes(),
                "line": {"color": "blue"},
            }),
            json!({
                "type": "scatter",
                "mode": "lines",
                "name": "MA50",
                "x": dates,
                "y": history.moving_average(SHORT_MA_WINDOW),
                "line": {"color": "orange", "dash": "dash"},
            }),
            json!({
                "type": "scatter",
                "mode": "lines",
                "name": "MA200",
                "x": dates,
                "y": history.moving_average(LONG_MA_WINDOW),
                "line": {"color": "green", "dash": "dash"},
            }),
        ],
        layout: json!({
            "template": TEMPLATE,
            "xaxis": {"title": {"text": "Date"}},
            "yaxis": {"title": {"text": "Price"}},
        }),
    })
}

pub fn volume_figure(history: &PriceHistory) -> Option<Figure> {
    if history.is_empty() {
        return None;
    }

    Some(Figure {
        data: vec![json!({
            "type": "bar",
            "x": history.dates(),
            "y": history.volumes(),
            "marker": {"color": "purple"},
        })],
        layout: json!({
            "template": TEMPLATE,
            "xaxis": {"title": {"text": "Date"}},
            "yaxis": {"title": {"text": "Volume"}},
        }),
    })
}
