//! Pure helper functions for extracting typed parameters from a `serde_json::Value` object.
//!
//! Each helper takes a JSON value, a key name, and a default. If the key is
//! missing or the value is not the expected type, the default is returned.
//! These never fail and always produce a usable value.

use serde_json::Value;

use crate::seed::Seed;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// Accepts both JSON numbers (including integers) and converts them to f64.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a strictly positive, finite `f64` from `params[name]`.
///
/// Zero, negative, and non-finite values fall back to `default`, so the
/// result is always safe to use as a multiplier or divisor.
pub fn param_positive_f64(params: &Value, name: &str, default: f64) -> f64 {
    let value = param_f64(params, name, default);
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

/// Extracts a `String` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Extracts a [`Seed`] from `params[name]`.
///
/// Any truthy JSON primitive becomes a seed; missing, null, and falsy values
/// yield `None`.
pub fn param_seed(params: &Value, name: &str) -> Option<Seed> {
    params.get(name).and_then(Seed::from_json)
}
