//! Counter arithmetic.
//!
//! MongoDB reports most statistics as counters accumulated since the server
//! started. These helpers turn two readings into a delta that never goes
//! negative, so a server restart shows up as a quiet interval rather than a
//! huge negative spike.

use serde_json::Value;

/// Natural difference between two counter readings.
///
/// Returns 0 when either reading is absent or not finite, otherwise
/// `max(current - previous, 0)`.
///
/// ```rust
/// use mongowatch_types::diff;
///
/// assert_eq!(diff(Some(120.0), Some(100.0)), 20.0);
/// assert_eq!(diff(Some(50.0), Some(1000.0)), 0.0); // counter reset
/// assert_eq!(diff(Some(50.0), None), 0.0);
/// ```
pub fn diff(current: Option<f64>, previous: Option<f64>) -> f64 {
    match (present(current), present(previous)) {
        (Some(current), Some(previous)) => (current - previous).max(0.0),
        _ => 0.0,
    }
}

/// Natural sum of several readings.
///
/// Missing and non-finite values count as 0 and the total is clamped at 0.
pub fn sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .filter_map(present)
        .sum::<f64>()
        .max(0.0)
}

/// Coerce a JSON value into a number, yielding 0 for anything non-numeric.
pub fn parse_numeric(value: &Value) -> f64 {
    numeric(value).unwrap_or(0.0)
}

/// Coerce a JSON value into a number.
///
/// Accepts plain numbers, numeric strings and the extended JSON wrappers
/// (`{"$numberLong": "42"}`) that some server versions emit.
pub fn numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Object(map) if map.len() == 1 => ["$numberLong", "$numberInt", "$numberDouble"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(numeric),
        _ => None,
    };
    n.and_then(|n| present(Some(n)))
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
