//! Numeric assertions: bounds, exclusive bounds, `multipleOf`.
use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

use super::ValidatorContext;
use crate::{
    equality::compare,
    error::{ValidationError, ValidationErrorKind},
    paths::{InstanceLocation, JsonPointer},
};

/// Relative-epsilon multiple test; `%` drifts for decimal multiples like
/// `0.0001`. Zero is a multiple of everything.
fn is_multiple_of(value: f64, multiple_of: f64) -> bool {
    if value == 0.0 {
        return true;
    }
    let quotient = value / multiple_of;
    (quotient - quotient.round()).abs() <= 1e-8 * quotient.abs().max(1.0)
}

pub(super) fn validate(
    ctx: &mut ValidatorContext<'_>,
    schema: &Map<String, Value>,
    schema_path: &JsonPointer,
    instance: &Number,
    location: &InstanceLocation<'_, '_>,
) {
    if let Some(Value::Number(limit)) = schema.get("minimum") {
        if compare(instance, limit) == Some(Ordering::Less) {
            ctx.errors.push(ValidationError::new(
                schema_path.join("minimum"),
                location.into(),
                ValidationErrorKind::Minimum {
                    limit: Value::Number(limit.clone()),
                },
            ));
        }
    }
    if let Some(Value::Number(limit)) = schema.get("maximum") {
        if compare(instance, limit) == Some(Ordering::Greater) {
            ctx.errors.push(ValidationError::new(
                schema_path.join("maximum"),
                location.into(),
                ValidationErrorKind::Maximum {
                    limit: Value::Number(limit.clone()),
                },
            ));
        }
    }
    if let Some(Value::Number(limit)) = schema.get("exclusiveMinimum") {
        if compare(instance, limit) != Some(Ordering::Greater) {
            ctx.errors.push(ValidationError::new(
                schema_path.join("exclusiveMinimum"),
                location.into(),
                ValidationErrorKind::ExclusiveMinimum {
                    limit: Value::Number(limit.clone()),
                },
            ));
        }
    }
    if let Some(Value::Number(limit)) = schema.get("exclusiveMaximum") {
        if compare(instance, limit) != Some(Ordering::Less) {
            ctx.errors.push(ValidationError::new(
                schema_path.join("exclusiveMaximum"),
                location.into(),
                ValidationErrorKind::ExclusiveMaximum {
                    limit: Value::Number(limit.clone()),
                },
            ));
        }
    }
    if let Some(Value::Number(multiple_of)) = schema.get("multipleOf") {
        let multiple_of = multiple_of.as_f64().expect("Always valid");
        let value = instance.as_f64().expect("Always valid");
        if !is_multiple_of(value, multiple_of) {
            ctx.errors.push(ValidationError::new(
                schema_path.join("multipleOf"),
                location.into(),
                ValidationErrorKind::MultipleOf { multiple_of },
            ));
        }
    }
}
