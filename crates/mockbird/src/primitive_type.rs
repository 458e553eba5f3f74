//! JSON primitive types as used by the `type` keyword.
use std::{convert::TryFrom, fmt, ops::BitOrAssign};

use serde_json::Value;

/// One JSON type name. `Integer` is kept separate from `Number` so the
/// subtype rule (every integer is a number) can be applied explicitly.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[allow(missing_docs)]
pub enum PrimitiveType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl PrimitiveType {
    const ALL: [PrimitiveType; 7] = [
        PrimitiveType::Array,
        PrimitiveType::Boolean,
        PrimitiveType::Integer,
        PrimitiveType::Null,
        PrimitiveType::Number,
        PrimitiveType::Object,
        PrimitiveType::String,
    ];

    const fn bit(self) -> u8 {
        match self {
            PrimitiveType::Array => 1,
            PrimitiveType::Boolean => 1 << 1,
            PrimitiveType::Integer => 1 << 2,
            PrimitiveType::Null => 1 << 3,
            PrimitiveType::Number => 1 << 4,
            PrimitiveType::Object => 1 << 5,
            PrimitiveType::String => 1 << 6,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveType::Array => f.write_str("array"),
            PrimitiveType::Boolean => f.write_str("boolean"),
            PrimitiveType::Integer => f.write_str("integer"),
            PrimitiveType::Null => f.write_str("null"),
            PrimitiveType::Number => f.write_str("number"),
            PrimitiveType::Object => f.write_str("object"),
            PrimitiveType::String => f.write_str("string"),
        }
    }
}

impl TryFrom<&str> for PrimitiveType {
    type Error = ();

    #[inline]
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "array" => Ok(PrimitiveType::Array),
            "boolean" => Ok(PrimitiveType::Boolean),
            "integer" => Ok(PrimitiveType::Integer),
            "null" => Ok(PrimitiveType::Null),
            "number" => Ok(PrimitiveType::Number),
            "object" => Ok(PrimitiveType::Object),
            "string" => Ok(PrimitiveType::String),
            _ => Err(()),
        }
    }
}

impl From<&Value> for PrimitiveType {
    fn from(instance: &Value) -> Self {
        match instance {
            Value::Null => PrimitiveType::Null,
            Value::Bool(_) => PrimitiveType::Boolean,
            Value::Number(number) => {
                // A float with a zero fractional part is an integer in
                // 2020-12 (`1.0` satisfies `type: integer`).
                if number.is_u64()
                    || number.is_i64()
                    || number.as_f64().is_some_and(|n| n.fract() == 0.0)
                {
                    PrimitiveType::Integer
                } else {
                    PrimitiveType::Number
                }
            }
            Value::String(_) => PrimitiveType::String,
            Value::Array(_) => PrimitiveType::Array,
            Value::Object(_) => PrimitiveType::Object,
        }
    }
}

/// A compact set of [`PrimitiveType`] values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrimitiveTypeSet {
    inner: u8,
}

impl PrimitiveTypeSet {
    pub(crate) const fn new() -> Self {
        Self { inner: 0 }
    }

    pub(crate) const fn contains(self, primitive_type: PrimitiveType) -> bool {
        self.inner & primitive_type.bit() != 0
    }

    /// Whether an instance of the given type is admitted, applying the
    /// integer-is-a-number subtype rule.
    pub(crate) const fn admits(self, actual: PrimitiveType) -> bool {
        self.contains(actual)
            || matches!(actual, PrimitiveType::Integer) && self.contains(PrimitiveType::Number)
    }

    /// Iterate the members in a fixed declaration-independent order.
    pub(crate) fn iter(self) -> impl Iterator<Item = PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .filter(move |primitive_type| self.contains(*primitive_type))
    }
}

impl BitOrAssign<PrimitiveType> for PrimitiveTypeSet {
    #[inline]
    fn bitor_assign(&mut self, rhs: PrimitiveType) {
        self.inner |= rhs.bit();
    }
}

impl FromIterator<PrimitiveType> for PrimitiveTypeSet {
    fn from_iter<I: IntoIterator<Item = PrimitiveType>>(iter: I) -> Self {
        let mut set = PrimitiveTypeSet::new();
        for primitive_type in iter {
            set |= primitive_type;
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::{PrimitiveType, PrimitiveTypeSet};
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn set_membership() {
        let set: PrimitiveTypeSet = [PrimitiveType::Null, PrimitiveType::String].into_iter().collect();
        assert!(set.contains(PrimitiveType::Null));
        assert!(set.contains(PrimitiveType::String));
        assert!(!set.contains(PrimitiveType::Array));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![PrimitiveType::Null, PrimitiveType::String]
        );
    }

    #[test]
    fn integers_are_numbers() {
        let set: PrimitiveTypeSet = [PrimitiveType::Number].into_iter().collect();
        assert!(set.admits(PrimitiveType::Integer));
        let integers_only: PrimitiveTypeSet = [PrimitiveType::Integer].into_iter().collect();
        assert!(!integers_only.admits(PrimitiveType::Number));
    }

    #[test_case(&json!(1), PrimitiveType::Integer; "positive integer")]
    #[test_case(&json!(-1), PrimitiveType::Integer; "negative integer")]
    #[test_case(&json!(1.5), PrimitiveType::Number; "fractional number")]
    #[test_case(&json!(2.0), PrimitiveType::Integer; "zero fraction float")]
    #[test_case(&json!(null), PrimitiveType::Null; "null")]
    #[test_case(&json!([]), PrimitiveType::Array; "array")]
    #[test_case(&json!({}), PrimitiveType::Object; "object")]
    fn detection(instance: &serde_json::Value, expected: PrimitiveType) {
        assert_eq!(PrimitiveType::from(instance), expected);
    }
}
