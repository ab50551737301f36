use crate::domain::fundamentals::FundamentalsRecord;
use serde::{Deserialize, Serialize};

pub const PIOTROSKI_F_SCORE: &str = "Piotroski F-Score";
pub const BENEISH_M_SCORE: &str = "Beneish M-Score";
pub const ALTMAN_Z_SCORE: &str = "Altman Z-Score";

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthScoreKind {
    /// Native range 0 to 9.
    Piotroski,
    /// Native range roughly -4 to +1.
    Beneish,
    /// Native range 0 to 5 and above.
    Altman,
}

impl HealthScoreKind {
    /// Resolves a display name. Unrecognised names are normalised on the Piotroski scale.
    pub fn from_name(name: &str) -> Self {
        match name {
            BENEISH_M_SCORE => HealthScoreKind::Beneish,
            ALTMAN_Z_SCORE => HealthScoreKind::Altman,
            _ => HealthScoreKind::Piotroski,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HealthScoreKind::Piotroski => PIOTROSKI_F_SCORE,
            HealthScoreKind::Beneish => BENEISH_M_SCORE,
            HealthScoreKind::Altman => ALTMAN_Z_SCORE,
        }
    }

    fn to_unit(self, v: f64) -> f64 {
        match self {
            HealthScoreKind::Beneish => (v + 4.0) / 5.0,
            HealthScoreKind::Altman => v / 5.0,
            HealthScoreKind::Piotroski => v / 9.0,
        }
    }
}

/// A raw health-score value. Integers and decimals print differently (`9` vs `9.0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HealthValue {
    Integer(i64),
    Decimal(f64),
}

impl HealthValue {
    pub fn as_f64(self) -> f64 {
        match self {
            HealthValue::Integer(i) => i as f64,
            HealthValue::Decimal(f) => f,
        }
    }
}

impl From<i64> for HealthValue {
    fn from(v: i64) -> Self {
        HealthValue::Integer(v)
    }
}

impl From<f64> for HealthValue {
    fn from(v: f64) -> Self {
        HealthValue::Decimal(v)
    }
}

/// One horizontal bar of the health-score chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBar {
    pub label: String,
    /// Position on the shared `[0, 1]` display scale.
    pub normalized: f64,
    pub text: String,
    pub color: String,
}

pub fn normalize_for_display(score_name: &str, value: Option<HealthValue>) -> ScoreBar {
    let (normalized, text) = match value {
        Some(v) if v.as_f64().is_finite() => {
            let kind = HealthScoreKind::from_name(score_name);
            let unit = kind.to_unit(v.as_f64()).clamp(0.0, 1.0);
            (unit, display_text(v))
        }
        _ => (0.0, NOT_AVAILABLE.to_string()),
    };

    ScoreBar {
        label: score_name.to_string(),
        normalized,
        text,
        color: gradient_color(normalized),
    }
}

// Decimals round half away from zero (`0.125` → `0.13`).
fn display_text(v: HealthValue) -> String {
    match v {
        HealthValue::Integer(i) => i.to_string(),
        HealthValue::Decimal(f) => {
            let rounded = match (f * 100.0).round() / 100.0 {
                r if r.is_finite() => r,
                _ => f,
            };
            let s = rounded.to_string();
            if s.contains('.') {
                s
            } else {
                format!("{s}.0")
            }
        }
    }
}

const RED: (f64, f64, f64) = (255.0, 0.0, 0.0);
const YELLOW: (f64, f64, f64) = (255.0, 255.0, 0.0);
const GREEN: (f64, f64, f64) = (0.0, 128.0, 0.0);

/// Colour at `t` on the red (0) → yellow (0.5) → green (1) scale.
pub fn gradient_color(t: f64) -> String {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let (from, to, local) = if t <= 0.5 {
        (RED, YELLOW, t / 0.5)
    } else {
        (YELLOW, GREEN, (t - 0.5) / 0.5)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * local).round() as u8;
    format!(
        "rgb({}, {}, {})",
        lerp(from.0, to.0),
        lerp(from.1, to.1),
        lerp(from.2, to.2)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthScores {
    pub piotroski: Option<HealthValue>,
    pub beneish: Option<HealthValue>,
    pub altman: Option<HealthValue>,
}

impl HealthScores {
    pub fn bars(&self) -> Vec<ScoreBar> {
        vec![
            normalize_for_display(HealthScoreKind::Piotroski.name(), self.piotroski),
            normalize_for_display(HealthScoreKind::Beneish.name(), self.beneish),
            normalize_for_display(HealthScoreKind::Altman.name(), self.altman),
        ]
    }
}

/// Supplies the three health scores for a company.
pub trait HealthScoreSource: Send + Sync {
    fn health_scores(&self, fundamentals: &FundamentalsRecord) -> HealthScores;
}

/// Fixed values shown until the scores are derived from financial statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderHealthScores;

impl HealthScoreSource for PlaceholderHealthScores {
    fn health_scores(&self, _fundamentals: &FundamentalsRecord) -> HealthScores {
        HealthScores {
            piotroski: Some(HealthValue::Decimal(0.8)),
            beneish: Some(HealthValue::Decimal(0.2)),
            altman: Some(HealthValue::Decimal(0.7)),
        }
    }
}
