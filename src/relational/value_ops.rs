//! Comparison of JSON cell values with SQL-like semantics
//!
//! - `null` never compares, so it never satisfies a predicate
//! - numbers compare numerically across integer and float representations
//! - values of different kinds (number vs string) are incomparable

use std::cmp::Ordering;

use serde_json::Value;

/// Ordering between two cells, or `None` when they are incomparable
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                return Some(x.cmp(&y));
            }
            if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                return Some(x.cmp(&y));
            }
            x.as_f64()?.partial_cmp(&y.as_f64()?)
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Hashable key such that cells comparing equal get equal keys.
///
/// `null` has no key. Integral floats share the key of the matching integer.
pub fn canonical_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(format!("n:{}", i));
            }
            if let Some(u) = n.as_u64() {
                return Some(format!("n:{}", u));
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f.abs() < 9.0e18 {
                Some(format!("n:{}", f as i64))
            } else {
                Some(format!("n:{}", f))
            }
        }
        Value::String(s) => Some(format!("s:{}", s)),
        Value::Bool(b) => Some(format!("b:{}", b)),
        other => Some(format!("j:{}", other)),
    }
}
