//! Property tests for the scoring normalizers and the screener filter.

use proptest::prelude::*;
use serde_json::json;
use stockdash_core::domain::fundamentals::FundamentalsRecord;
use stockdash_core::scoring::axis::{normalize, scale, Axis, MAX_AXIS_SCORE};
use stockdash_core::scoring::health::{
    normalize_for_display, HealthValue, ALTMAN_Z_SCORE, BENEISH_M_SCORE, PIOTROSKI_F_SCORE,
};
use stockdash_core::screener::{filter, sample_dataset, AxisThresholds, ScreenerRow};

fn arb_metric() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        1 => Just(None),
        1 => Just(Some(0.0)),
        6 => (-1_000.0..1_000.0_f64).prop_map(Some),
        1 => prop::num::f64::ANY.prop_map(Some),
    ]
}

fn arb_record() -> impl Strategy<Value = FundamentalsRecord> {
    (
        arb_metric(),
        arb_metric(),
        arb_metric(),
        arb_metric(),
        arb_metric(),
        arb_metric(),
        arb_metric(),
    )
        .prop_map(|(trailing, forward, growth, margins, de, yield_, roe)| {
            let mut record = FundamentalsRecord::default();
            for (key, value) in [
                ("trailingPE", trailing),
                ("forwardPE", forward),
                ("revenueGrowth", growth),
                ("profitMargins", margins),
                ("debtToEquity", de),
                ("dividendYield", yield_),
                ("returnOnEquity", roe),
            ] {
                // serde_json turns non-finite floats into null.
                if let Some(v) = value {
                    record.insert(key, json!(v));
                }
            }
            record
        })
}

fn arb_health_value() -> impl Strategy<Value = Option<HealthValue>> {
    prop_oneof![
        Just(None),
        (-100i64..100).prop_map(|i| Some(HealthValue::Integer(i))),
        prop::num::f64::ANY.prop_map(|f| Some(HealthValue::Decimal(f))),
    ]
}

fn arb_thresholds() -> impl Strategy<Value = AxisThresholds> {
    prop::array::uniform6(0u8..=5).prop_map(|t| AxisThresholds {
        valuation: t[0],
        growth: t[1],
        profitability: t[2],
        balance_sheet: t[3],
        dividends: t[4],
        management: t[5],
    })
}

fn qualifies(row: &ScreenerRow, t: &AxisThresholds) -> bool {
    let rating = |axis: Axis| match axis {
        Axis::Valuation => (t.valuation, row.valuation),
        Axis::Growth => (t.growth, row.growth),
        Axis::Profitability => (t.profitability, row.profitability),
        Axis::BalanceSheet => (t.balance_sheet, row.balance_sheet),
        Axis::Dividends => (t.dividends, row.dividends),
        Axis::Management => (t.management, row.management),
    };
    Axis::ALL.into_iter().all(|axis| {
        let (min, value) = rating(axis);
        min == 0 || value >= min
    })
}

proptest! {
    #[test]
    fn axis_scores_stay_in_range(record in arb_record()) {
        let scores = normalize(&record);
        for (axis, score) in scores.iter() {
            prop_assert!(
                (0.0..=MAX_AXIS_SCORE).contains(&score),
                "{axis} scored {score}"
            );
        }
    }

    #[test]
    fn metric_normalizer_is_idempotent(record in arb_record()) {
        let first = normalize(&record);
        let second = normalize(&record);
        for ((_, a), (_, b)) in first.iter().zip(second.iter()) {
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn scale_is_monotone(a in -2.0..2.0_f64, b in -2.0..2.0_f64) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(scale(Some(lo), 0.0, 0.5) <= scale(Some(hi), 0.0, 0.5));
    }

    #[test]
    fn scale_saturates(v in 0.5..1e6_f64) {
        prop_assert_eq!(scale(Some(v), 0.0, 0.5), 5.0);
        prop_assert_eq!(scale(Some(-v), 0.0, 0.5), 0.0);
    }

    #[test]
    fn score_bars_stay_on_unit_scale(value in arb_health_value()) {
        for name in [PIOTROSKI_F_SCORE, BENEISH_M_SCORE, ALTMAN_Z_SCORE, "Custom Score"] {
            let bar = normalize_for_display(name, value);
            prop_assert!((0.0..=1.0).contains(&bar.normalized));
            prop_assert!(bar.color.starts_with("rgb("));
        }
    }

    #[test]
    fn score_bar_normalizer_is_idempotent(value in arb_health_value()) {
        let first = normalize_for_display(ALTMAN_Z_SCORE, value);
        let second = normalize_for_display(ALTMAN_Z_SCORE, value);
        prop_assert_eq!(first.normalized.to_bits(), second.normalized.to_bits());
        prop_assert_eq!(first.text, second.text);
        prop_assert_eq!(first.color, second.color);
    }

    #[test]
    fn screener_keeps_exactly_the_qualifying_rows(thresholds in arb_thresholds()) {
        let rows = sample_dataset();
        let kept = filter(&rows, &thresholds);

        for row in &kept {
            prop_assert!(qualifies(row, &thresholds), "{} should not pass", row.company);
        }

        // Every qualifying row appears, in dataset order.
        let expected: Vec<&ScreenerRow> =
            rows.iter().filter(|r| qualifies(r, &thresholds)).collect();
        prop_assert_eq!(kept.iter().collect::<Vec<_>>(), expected);
    }
}
