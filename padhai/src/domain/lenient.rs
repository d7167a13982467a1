//! Counters coming from SQL aggregates arrive as numbers, numeric strings
//! (`"3"`, `"61.50"`) or `null` depending on the query.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn as_f64(&self) -> f64 {
        match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) => s.trim().parse().unwrap_or(0.0),
        }
    }
}

pub(crate) fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = Option::<Numeric>::deserialize(deserializer)?;
    let value = raw.map(|n| n.as_f64()).unwrap_or(0.0);
    if value.is_finite() && value > 0.0 {
        Ok(value.round().min(u32::MAX as f64) as u32)
    } else {
        Ok(0)
    }
}

pub(crate) fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = Option::<Numeric>::deserialize(deserializer)?;
    let value = raw.map(|n| n.as_f64()).unwrap_or(0.0);
    Ok(if value.is_finite() { value } else { 0.0 })
}
