use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Named company fields as returned by the market-data provider, keyed the way the provider
/// names them (`trailingPE`, `profitMargins`, `shortName`, ...).
///
/// Read-only and ephemeral: built once per lookup and dropped with the response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FundamentalsRecord {
    fields: BTreeMap<String, Value>,
}

impl FundamentalsRecord {
    pub fn new(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Finite numeric value of a field. Non-numeric and non-finite values count as absent.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        let v = self.get(key)?;
        v.as_i64().or_else(|| {
            v.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        })
    }

    /// Non-blank string value of a field.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn officers(&self) -> Vec<Officer> {
        let Some(Value::Array(items)) = self.get("companyOfficers") else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| {
                let name = item.get("name")?.as_str()?.trim().to_string();
                if name.is_empty() {
                    return None;
                }
                let title = item
                    .get("title")
                    .and_then(Value::as_str)
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty());
                let total_pay = item.get("totalPay").and_then(number_or_raw);
                Some(Officer {
                    name,
                    title,
                    total_pay,
                })
            })
            .collect()
    }
}

impl FromIterator<(String, Value)> for FundamentalsRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Officer {
    pub name: String,
    pub title: Option<String>,
    pub total_pay: Option<f64>,
}

// Accepts both a bare number and the provider's `{"raw": .., "fmt": ..}` wrapper.
fn number_or_raw(v: &Value) -> Option<f64> {
    match v {
        Value::Object(map) => map.get("raw").and_then(Value::as_f64),
        other => other.as_f64(),
    }
    .filter(|f| f.is_finite())
}
