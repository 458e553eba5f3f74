//! Numeric comparison, deep equality, and canonical hashing for JSON values.
//!
//! Numbers compare across representations (`1` equals `1.0`); object key
//! order never matters.
use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

use num_cmp::NumCmp;
use serde_json::{Map, Number, Value};

/// A JSON number in its widest native representation.
#[derive(Copy, Clone)]
pub(crate) enum Num {
    U(u64),
    I(i64),
    F(f64),
}

pub(crate) fn num(number: &Number) -> Num {
    if let Some(value) = number.as_u64() {
        Num::U(value)
    } else if let Some(value) = number.as_i64() {
        Num::I(value)
    } else {
        Num::F(number.as_f64().expect("Always valid"))
    }
}

/// Representation-independent comparison; never `None` for JSON numbers
/// (no NaN survives parsing).
pub(crate) fn compare(left: &Number, right: &Number) -> Option<Ordering> {
    match (num(left), num(right)) {
        (Num::U(a), Num::U(b)) => a.partial_cmp(&b),
        (Num::U(a), Num::I(b)) => NumCmp::num_cmp(a, b),
        (Num::U(a), Num::F(b)) => NumCmp::num_cmp(a, b),
        (Num::I(a), Num::U(b)) => NumCmp::num_cmp(a, b),
        (Num::I(a), Num::I(b)) => a.partial_cmp(&b),
        (Num::I(a), Num::F(b)) => NumCmp::num_cmp(a, b),
        (Num::F(a), Num::U(b)) => NumCmp::num_cmp(a, b),
        (Num::F(a), Num::I(b)) => NumCmp::num_cmp(a, b),
        (Num::F(a), Num::F(b)) => a.partial_cmp(&b),
    }
}

pub(crate) fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(left), Value::Bool(right)) => left == right,
        (Value::String(left), Value::String(right)) => left == right,
        (Value::Number(left), Value::Number(right)) => {
            compare(left, right) == Some(Ordering::Equal)
        }
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len()
                && left.iter().zip(right.iter()).all(|(a, b)| equal(a, b))
        }
        (Value::Object(left), Value::Object(right)) => equal_objects(left, right),
        (_, _) => false,
    }
}

#[inline]
pub(crate) fn equal_objects(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(key, value)| right.get(key).is_some_and(|other| equal(value, other)))
}

/// Wrapper making a JSON value hashable under the same equivalence as
/// [`equal`]. Each variant contributes a type tag, numbers hash through one
/// canonical form, and object entries are hashed in sorted key order so the
/// order keys were written cannot influence the result.
pub(crate) struct HashedValue<'a>(pub(crate) &'a Value);

impl PartialEq for HashedValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        equal(self.0, other.0)
    }
}

impl Eq for HashedValue<'_> {}

impl Hash for HashedValue<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.0 {
            Value::Null => state.write_u8(0),
            Value::Bool(item) => {
                state.write_u8(1);
                state.write_u8(u8::from(*item));
            }
            Value::Number(item) => {
                state.write_u8(2);
                hash_number(item, state);
            }
            Value::String(item) => {
                state.write_u8(3);
                item.hash(state);
            }
            Value::Array(items) => {
                state.write_u8(4);
                state.write_usize(items.len());
                for item in items {
                    HashedValue(item).hash(state);
                }
            }
            Value::Object(entries) => {
                state.write_u8(5);
                state.write_usize(entries.len());
                let mut keys: Vec<&String> = entries.keys().collect();
                keys.sort_unstable();
                for key in keys {
                    key.hash(state);
                    HashedValue(&entries[key.as_str()]).hash(state);
                }
            }
        }
    }
}

/// Integer-valued numbers hash through `i128` whatever their wire
/// representation, so `1`, `-1`, and `1.0` land in one bucket, matching
/// [`compare`]. Only genuinely fractional (or astronomically large) floats
/// fall back to their bit pattern.
fn hash_number<H: Hasher>(number: &Number, state: &mut H) {
    match num(number) {
        Num::U(value) => state.write_i128(i128::from(value)),
        Num::I(value) => state.write_i128(i128::from(value)),
        Num::F(value) => {
            if value.fract() == 0.0 && value.abs() < 2f64.powi(127) {
                #[allow(clippy::cast_possible_truncation)]
                state.write_i128(value as i128);
            } else {
                state.write_u64(value.to_bits());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{compare, equal, HashedValue};
    use ahash::AHashSet;
    use serde_json::{json, Value};
    use std::cmp::Ordering;
    use test_case::test_case;

    #[test_case(&json!(1), &json!(1.0))]
    #[test_case(&json!([2]), &json!([2.0]))]
    #[test_case(&json!({"a": 1, "b": 2}), &json!({"b": 2, "a": 1}))]
    #[test_case(&json!(null), &json!(null))]
    fn are_equal(left: &Value, right: &Value) {
        assert!(equal(left, right));
    }

    #[test_case(&json!(1), &json!(2.0))]
    #[test_case(&json!([]), &json!(["x"]))]
    #[test_case(&json!({"a": 1}), &json!({"a": 1, "b": 2}))]
    #[test_case(&json!("1"), &json!(1))]
    fn are_not_equal(left: &Value, right: &Value) {
        assert!(!equal(left, right));
    }

    #[test]
    fn comparison_spans_representations() {
        let one = serde_json::Number::from(1);
        let one_f = serde_json::Number::from_f64(1.0).unwrap();
        let minus = serde_json::Number::from(-3);
        assert_eq!(compare(&one, &one_f), Some(Ordering::Equal));
        assert_eq!(compare(&minus, &one_f), Some(Ordering::Less));
        assert_eq!(compare(&one_f, &minus), Some(Ordering::Greater));
    }

    #[test]
    fn key_order_does_not_change_hash_membership() {
        let mut seen = AHashSet::new();
        let first = json!({"a": 1, "b": 2});
        let second = json!({"b": 2, "a": 1});
        seen.insert(HashedValue(&first));
        assert!(!seen.insert(HashedValue(&second)));
    }

    #[test]
    fn equal_numbers_share_a_bucket_across_representations() {
        let mut seen = AHashSet::new();
        let integer = json!(1);
        let float = json!(1.0);
        let nested = json!([{"n": 1}]);
        let nested_float = json!([{"n": 1.0}]);
        seen.insert(HashedValue(&integer));
        assert!(!seen.insert(HashedValue(&float)));
        seen.insert(HashedValue(&nested));
        assert!(!seen.insert(HashedValue(&nested_float)));
    }
}
