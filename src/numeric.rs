//! Lenient numeric coercion for loosely-typed input.
//!
//! External payloads and CSV cells carry quantities and prices as JSON numbers,
//! numeric strings, or garbage. Everything funnels through these helpers, which
//! coerce to `f64` and fall back to `0.0` for missing, non-numeric, or
//! non-finite input. Callers are expected to filter zero-valued records with a
//! validity predicate rather than handle parse errors.

use serde_json::Value;

/// Parses a string as `f64`, returning `0.0` for anything that is not a
/// finite number (empty string, whitespace, text, inf/NaN).
pub fn parse_f64_or_zero(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Coerces an optional JSON value to `f64` with a `0.0` fallback.
///
/// JSON numbers pass through, numeric strings are parsed, and everything else
/// (null, booleans, arrays, objects, absent values) becomes `0.0`.
pub fn coerce_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => v,
            _ => 0.0,
        },
        Some(Value::String(s)) => parse_f64_or_zero(s),
        _ => 0.0,
    }
}
