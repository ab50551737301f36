use serde_json::Value;

pub const NOT_AVAILABLE: &str = "N/A";

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Shortest decimal form with at least one fractional digit (`2.0`, `36.62`).
pub fn format_decimal(v: f64) -> String {
    let s = v.to_string();
    if s.contains('.') || !v.is_finite() {
        s
    } else {
        format!("{s}.0")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Integer with comma thousands separators.
pub fn format_grouped_integer(v: i64) -> String {
    let digits = v.unsigned_abs().to_string();
    let sign = if v < 0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(&digits))
}

/// Float with comma thousands separators, keeping at least one fractional digit (`35.0`).
pub fn format_grouped(v: f64) -> String {
    let s = format_decimal(v);
    if !v.is_finite() || s.contains('e') {
        return s;
    }

    let (sign, body) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    match body.split_once('.') {
        Some((int_part, frac)) => format!("{sign}{}.{frac}", group_thousands(int_part)),
        None => format!("{sign}{}", group_thousands(body)),
    }
}

/// Grouped JSON number. Integers print bare, floats keep a fraction.
pub fn format_grouped_value(v: &Value) -> Option<String> {
    if let Some(i) = v.as_i64() {
        return Some(format_grouped_integer(i));
    }
    v.as_f64()
        .filter(|f| f.is_finite())
        .map(format_grouped)
}

/// Fraction shown as a percentage with two decimals (`0.0052` → `0.52 %`).
pub fn format_percent(v: f64) -> String {
    format!("{:.2} %", v * 100.0)
}

pub fn or_not_available(v: Option<String>) -> String {
    v.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
