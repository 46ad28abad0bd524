//! Partial JSON matching for response assertions.

use serde_json::Value;

/// Whether `actual` contains everything in `expected`.
///
/// Objects match when every expected key is present and matches. Arrays
/// match when every expected element matches some element of `actual`, in
/// any order. Numbers compare by value, so `1` matches `1.0`, but two
/// integers must be exactly equal. Anything else must be equal.
pub fn json_like(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(actual), Value::Object(expected)) => expected
            .iter()
            .all(|(key, want)| actual.get(key).is_some_and(|have| json_like(have, want))),
        (Value::Array(actual), Value::Array(expected)) => expected
            .iter()
            .all(|want| actual.iter().any(|have| json_like(have, want))),
        (Value::Number(a), Value::Number(b)) => {
            a == b || ((a.is_f64() || b.is_f64()) && a.as_f64() == b.as_f64())
        }
        _ => actual == expected,
    }
}
