//! Tension (force) measurements taken on a stencil.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Column names of the five readings, in order.
pub const READING_COLUMNS: [&str; 5] = ["da", "db", "dc", "dd", "de"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensionRecord {
    pub id: i64,
    pub fecha: DateTime<Utc>,
    pub numero: String,
    pub model: Option<String>,
    pub da: Option<f64>,
    pub db: Option<f64>,
    pub dc: Option<f64>,
    pub dd: Option<f64>,
    pub de: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub operador: String,
    pub supervisor: String,
}

impl TensionRecord {
    pub fn readings(&self) -> [Option<f64>; 5] {
        [self.da, self.db, self.dc, self.dd, self.de]
    }

    /// Pass/fail per reading; `None` where no reading was taken.
    pub fn verdicts(&self) -> [Option<bool>; 5] {
        self.readings().map(|r| in_range(r, self.min, self.max))
    }

    /// True when every reading taken lies within the thresholds.
    pub fn passed(&self) -> bool {
        self.verdicts().iter().all(|v| v.unwrap_or(true))
    }
}

/// Range check. The thresholds may be stored in either order.
pub fn in_range(value: Option<f64>, min: f64, max: f64) -> Option<bool> {
    let v = value?;
    if v.is_nan() || min.is_nan() || max.is_nan() {
        return None;
    }
    let lo = min.min(max);
    let hi = min.max(max);
    Some(v >= lo && v <= hi)
}

/// Readings are stored as negative magnitudes with two decimals.
pub fn normalize_reading(x: f64) -> f64 {
    let magnitude = (x.abs() * 100.0).round() / 100.0;
    if magnitude == 0.0 { 0.0 } else { -magnitude }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidReading;

/// Accepts JSON numbers and numeric strings. Absent, `null` and `""` mean
/// "no reading".
pub fn parse_reading(value: Option<&Value>) -> Result<Option<f64>, InvalidReading> {
    let n = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64().ok_or(InvalidReading)?,
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| InvalidReading)?,
        Some(_) => return Err(InvalidReading),
    };
    if !n.is_finite() {
        return Err(InvalidReading);
    }
    Ok(Some(normalize_reading(n)))
}

/// Stencil numbers arrive as strings or bare numbers. Empty strings and
/// `null` count as missing; `0` is a valid number.
pub fn parse_stencil_number(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
