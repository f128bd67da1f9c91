//! Equality of argument values.
//!
//! Defaults and dispatch keys are matched by value. Numbers compare by
//! numeric value, so `0`, `0.0` and `-0.0` are the same argument; every
//! other kind compares structurally and kinds never cross (`1` is not
//! `true`, `"1"` is not `1`).

use serde_json::{Number, Value};

/// Whether two argument values are equal.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => numbers_equal(left, right),
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len()
                && left.iter().zip(right).all(|(l, r)| values_equal(l, r))
        }
        (Value::Object(left), Value::Object(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .all(|(key, l)| right.get(key).is_some_and(|r| values_equal(l, r)))
        }
        _ => left == right,
    }
}

fn numbers_equal(left: &Number, right: &Number) -> bool {
    match (integer(left), integer(right)) {
        (Some(l), Some(r)) => l == r,
        (Some(int), None) => float_equals_integer(right, int),
        (None, Some(int)) => float_equals_integer(left, int),
        (None, None) => left.as_f64() == right.as_f64(),
    }
}

fn integer(number: &Number) -> Option<i128> {
    number
        .as_i64()
        .map(i128::from)
        .or_else(|| number.as_u64().map(i128::from))
}

// Exact: large integers are not rounded through f64.
fn float_equals_integer(float: &Number, int: i128) -> bool {
    match float.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 => f as i128 == int,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_and_floats_compare_numerically() {
        assert!(values_equal(&json!(0), &json!(0.0)));
        assert!(values_equal(&json!(1.0), &json!(1)));
        assert!(values_equal(&json!(-3), &json!(-3.0)));
        assert!(values_equal(&json!(0), &json!(-0.0)));
        assert!(!values_equal(&json!(1), &json!(1.5)));
        assert!(values_equal(&json!(2.5), &json!(2.5)));
        assert!(values_equal(&json!(u64::MAX), &json!(u64::MAX)));
        assert!(!values_equal(&json!(-1), &json!(u64::MAX)));
    }

    #[test]
    fn large_integers_are_not_rounded() {
        let big = (1u64 << 53) + 1;
        assert!(!values_equal(&json!(big), &json!((1u64 << 53) as f64)));
        assert!(values_equal(&json!(1u64 << 53), &json!((1u64 << 53) as f64)));
    }

    #[test]
    fn kinds_do_not_cross() {
        assert!(!values_equal(&json!(1), &json!(true)));
        assert!(!values_equal(&json!(0), &json!(false)));
        assert!(!values_equal(&json!("1"), &json!(1)));
        assert!(!values_equal(&json!(null), &json!(0)));
        assert!(values_equal(&json!(null), &json!(null)));
    }

    #[test]
    fn containers_compare_element_wise() {
        assert!(values_equal(&json!([1, 2.0]), &json!([1.0, 2])));
        assert!(!values_equal(&json!([1]), &json!([1, 1])));
        assert!(values_equal(
            &json!({"mode": "fast", "level": 2}),
            &json!({"level": 2.0, "mode": "fast"})
        ));
        assert!(!values_equal(&json!({"a": 1}), &json!({"b": 1})));
    }
}
