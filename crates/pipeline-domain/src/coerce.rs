//! Lenient field coercion shared by the wire decoder and the CSV reader.
//!
//! Sensor exports are messy: timestamps arrive in scientific notation,
//! measurements arrive as quoted strings, and empty cells are common. The
//! policy everywhere is the same: coerce what can be coerced, turn the rest
//! into `None` rather than failing the whole record.

/// Parse a float from text, tolerating surrounding whitespace.
pub fn float_from_str(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}

/// Parse an integer from text, going through `f64` first because timestamps
/// are exported in scientific notation (e.g. `"1.6e9"`). The fractional part
/// is truncated.
pub fn int_from_str(value: &str) -> Option<i64> {
    float_from_str(value).map(|f| f as i64)
}

/// Coerce a JSON value to a float: numbers pass through, numeric strings are
/// parsed, everything else becomes `None`.
pub fn float_from_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => float_from_str(s),
        _ => None,
    }
}

/// Coerce a JSON value to an integer with the same rules as [`int_from_str`].
pub fn int_from_value(value: &serde_json::Value) -> Option<i64> {
    float_from_value(value).map(|f| f as i64)
}

/// Coerce a JSON value to a string; only actual strings qualify.
pub fn string_from_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
