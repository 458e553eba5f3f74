//! Array assertions: sizes, uniqueness, `prefixItems`/`items`, `contains`.
use ahash::AHashMap;
use serde_json::{Map, Value};

use super::{Evaluated, ValidatorContext};
use crate::{
    equality::HashedValue,
    error::{ValidationError, ValidationErrorKind},
    paths::{InstanceLocation, JsonPointer},
    validator::validate_schema,
};

pub(super) fn validate(
    ctx: &mut ValidatorContext<'_>,
    schema: &Map<String, Value>,
    schema_path: &JsonPointer,
    items: &[Value],
    location: &InstanceLocation<'_, '_>,
    evaluated: &mut Evaluated,
) {
    if let Some(limit) = schema.get("minItems").and_then(Value::as_u64) {
        if (items.len() as u64) < limit {
            ctx.errors.push(ValidationError::new(
                schema_path.join("minItems"),
                location.into(),
                ValidationErrorKind::MinItems { limit },
            ));
        }
    }
    if let Some(limit) = schema.get("maxItems").and_then(Value::as_u64) {
        if (items.len() as u64) > limit {
            ctx.errors.push(ValidationError::new(
                schema_path.join("maxItems"),
                location.into(),
                ValidationErrorKind::MaxItems { limit },
            ));
        }
    }

    if schema.get("uniqueItems").and_then(Value::as_bool) == Some(true) {
        let mut seen: AHashMap<HashedValue<'_>, usize> = AHashMap::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if let Some(&first) = seen.get(&HashedValue(item)) {
                // The first duplicate stops reporting.
                ctx.errors.push(ValidationError::new(
                    schema_path.join("uniqueItems"),
                    location.into(),
                    ValidationErrorKind::UniqueItems {
                        first,
                        second: index,
                    },
                ));
                break;
            }
            seen.insert(HashedValue(item), index);
        }
    }

    let prefix_len = match schema.get("prefixItems") {
        Some(Value::Array(prefixes)) => {
            let prefix_path = schema_path.join("prefixItems");
            for (index, prefix) in prefixes.iter().enumerate().take(items.len()) {
                let item_location = location.push(index);
                let mut item_evaluated = Evaluated::default();
                validate_schema(
                    ctx,
                    prefix,
                    &prefix_path.join(index),
                    &items[index],
                    &item_location,
                    &mut item_evaluated,
                );
                evaluated.items.insert(index);
            }
            prefixes.len()
        }
        _ => 0,
    };

    if let Some(items_schema) = schema.get("items") {
        let items_path = schema_path.join("items");
        for (index, item) in items.iter().enumerate().skip(prefix_len) {
            let item_location = location.push(index);
            let mut item_evaluated = Evaluated::default();
            validate_schema(
                ctx,
                items_schema,
                &items_path,
                item,
                &item_location,
                &mut item_evaluated,
            );
            evaluated.items.insert(index);
        }
    }

    if let Some(contains_schema) = schema.get("contains") {
        let contains_path = schema_path.join("contains");
        let mut count = 0u64;
        for (index, item) in items.iter().enumerate() {
            let item_location = location.push(index);
            let mut item_evaluated = Evaluated::default();
            if ctx.probe(
                contains_schema,
                &contains_path,
                item,
                &item_location,
                &mut item_evaluated,
            ) {
                count += 1;
                evaluated.items.insert(index);
            }
        }
        let min_contains = schema
            .get("minContains")
            .and_then(Value::as_u64)
            .unwrap_or(1);
        let max_contains = schema.get("maxContains").and_then(Value::as_u64);
        // `minContains: 0` disables the `contains` failure entirely.
        if count < min_contains {
            if schema.contains_key("minContains") {
                ctx.errors.push(ValidationError::new(
                    schema_path.join("minContains"),
                    location.into(),
                    ValidationErrorKind::MinContains {
                        limit: min_contains,
                        count,
                    },
                ));
            } else {
                ctx.errors.push(ValidationError::new(
                    contains_path.clone(),
                    location.into(),
                    ValidationErrorKind::Contains,
                ));
            }
        }
        if let Some(limit) = max_contains {
            if count > limit {
                ctx.errors.push(ValidationError::new(
                    schema_path.join("maxContains"),
                    location.into(),
                    ValidationErrorKind::MaxContains { limit, count },
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minItems": 2}), &json!([1, 2]))]
    #[test_case(&json!({"maxItems": 2}), &json!([1, 2]))]
    #[test_case(&json!({"uniqueItems": true}), &json!([1, "1", [1], {"a": 1}]))]
    #[test_case(&json!({"items": {"type": "integer"}}), &json!([1, 2, 3]))]
    #[test_case(&json!({"prefixItems": [{"type": "string"}], "items": {"type": "integer"}}), &json!(["id", 1, 2]))]
    #[test_case(&json!({"contains": {"type": "integer"}}), &json!(["x", 3]))]
    #[test_case(&json!({"contains": {"type": "integer"}, "minContains": 0}), &json!(["x"]); "minContains zero disables contains")]
    #[test_case(&json!({"contains": {"type": "integer"}, "maxContains": 2}), &json!([1, "x", 2]))]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"minItems": 3}), &json!([1]), "minItems")]
    #[test_case(&json!({"maxItems": 1}), &json!([1, 2]), "maxItems")]
    #[test_case(&json!({"contains": {"type": "integer"}}), &json!(["x"]), "contains")]
    #[test_case(&json!({"contains": {"type": "integer"}, "minContains": 2}), &json!([1, "x"]), "minContains")]
    #[test_case(&json!({"contains": {"type": "integer"}, "maxContains": 1}), &json!([1, 2]), "maxContains")]
    fn invalid(schema: &Value, instance: &Value, keyword: &str) {
        let errors = tests_util::validate(schema, instance).errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword(), keyword);
    }

    #[test]
    fn unique_items_ignores_key_order() {
        let errors = tests_util::validate(
            &json!({"uniqueItems": true}),
            &json!([{"a": 1, "b": 2}, {"b": 2, "a": 1}]),
        )
        .errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword(), "uniqueItems");
        assert_eq!(errors[0].params(), json!({"i": 0, "j": 1}));
    }

    #[test]
    fn first_duplicate_stops_reporting() {
        let errors = tests_util::validate(&json!({"uniqueItems": true}), &json!([1, 1, 2, 2])).errors;
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn items_failures_carry_the_index() {
        let errors = tests_util::validate(
            &json!({"items": {"type": "integer"}}),
            &json!([1, "x", 3]),
        )
        .errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].instance_path.to_string(), "/1");
        assert_eq!(errors[0].schema_path.to_string(), "/items/type");
    }
}
