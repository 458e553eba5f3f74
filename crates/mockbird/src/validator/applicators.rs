//! Composition applicators, conditionals, and the `unevaluated*` pair.
//!
//! Branches probed for a pass/fail verdict (`anyOf`, `oneOf`, `not`, `if`)
//! run against a temporary error buffer; only `allOf`, `then`, `else`, and
//! `unevaluated*` contribute errors directly. Evaluated-set annotations from
//! passing branches are unioned before `unevaluated*` runs.
use serde_json::{Map, Value};

use super::{Evaluated, ValidatorContext};
use crate::{
    error::{ValidationError, ValidationErrorKind},
    paths::{InstanceLocation, JsonPointer},
    validator::validate_schema,
};

pub(super) fn validate(
    ctx: &mut ValidatorContext<'_>,
    schema: &Map<String, Value>,
    schema_path: &JsonPointer,
    instance: &Value,
    location: &InstanceLocation<'_, '_>,
    evaluated: &mut Evaluated,
) {
    if let Some(Value::Array(branches)) = schema.get("allOf") {
        let all_of_path = schema_path.join("allOf");
        for (index, branch) in branches.iter().enumerate() {
            let before = ctx.errors.len();
            let mut branch_evaluated = Evaluated::default();
            validate_schema(
                ctx,
                branch,
                &all_of_path.join(index),
                instance,
                location,
                &mut branch_evaluated,
            );
            if ctx.errors.len() == before {
                evaluated.union(&branch_evaluated);
            }
        }
    }

    if let Some(Value::Array(branches)) = schema.get("anyOf") {
        let any_of_path = schema_path.join("anyOf");
        let mut passed = false;
        for (index, branch) in branches.iter().enumerate() {
            let mut branch_evaluated = Evaluated::default();
            if ctx.probe(
                branch,
                &any_of_path.join(index),
                instance,
                location,
                &mut branch_evaluated,
            ) {
                evaluated.union(&branch_evaluated);
                passed = true;
                // First passing branch wins.
                break;
            }
        }
        if !passed {
            ctx.errors.push(ValidationError::new(
                any_of_path,
                location.into(),
                ValidationErrorKind::AnyOf,
            ));
        }
    }

    if let Some(Value::Array(branches)) = schema.get("oneOf") {
        let one_of_path = schema_path.join("oneOf");
        // Every branch runs so the error can name all passing indexes.
        let mut passing = Vec::new();
        let mut passing_evaluated = Evaluated::default();
        for (index, branch) in branches.iter().enumerate() {
            let mut branch_evaluated = Evaluated::default();
            if ctx.probe(
                branch,
                &one_of_path.join(index),
                instance,
                location,
                &mut branch_evaluated,
            ) {
                passing.push(index);
                passing_evaluated = branch_evaluated;
            }
        }
        match passing.len() {
            1 => evaluated.union(&passing_evaluated),
            0 => ctx.errors.push(ValidationError::new(
                one_of_path,
                location.into(),
                ValidationErrorKind::OneOfNotValid,
            )),
            _ => ctx.errors.push(ValidationError::new(
                one_of_path,
                location.into(),
                ValidationErrorKind::OneOfMultipleValid { passing },
            )),
        }
    }

    if let Some(negated) = schema.get("not") {
        let not_path = schema_path.join("not");
        let mut branch_evaluated = Evaluated::default();
        if ctx.probe(negated, &not_path, instance, location, &mut branch_evaluated) {
            ctx.errors.push(ValidationError::new(
                not_path,
                location.into(),
                ValidationErrorKind::Not,
            ));
        }
    }

    if let Some(condition) = schema.get("if") {
        let mut condition_evaluated = Evaluated::default();
        // The `if` verdict never contributes errors to the outer list.
        let condition_holds = ctx.probe(
            condition,
            &schema_path.join("if"),
            instance,
            location,
            &mut condition_evaluated,
        );
        if condition_holds {
            evaluated.union(&condition_evaluated);
            if let Some(consequent) = schema.get("then") {
                let before = ctx.errors.len();
                let mut branch_evaluated = Evaluated::default();
                validate_schema(
                    ctx,
                    consequent,
                    &schema_path.join("then"),
                    instance,
                    location,
                    &mut branch_evaluated,
                );
                if ctx.errors.len() == before {
                    evaluated.union(&branch_evaluated);
                }
            }
        } else if let Some(alternative) = schema.get("else") {
            let before = ctx.errors.len();
            let mut branch_evaluated = Evaluated::default();
            validate_schema(
                ctx,
                alternative,
                &schema_path.join("else"),
                instance,
                location,
                &mut branch_evaluated,
            );
            if ctx.errors.len() == before {
                evaluated.union(&branch_evaluated);
            }
        }
    }

    if let Some(unevaluated_schema) = schema.get("unevaluatedProperties") {
        if let Value::Object(map) = instance {
            let unevaluated_path = schema_path.join("unevaluatedProperties");
            let uncovered: Vec<&String> = map
                .keys()
                .filter(|key| !evaluated.properties.contains(key.as_str()))
                .collect();
            if let Value::Bool(false) = unevaluated_schema {
                if !uncovered.is_empty() {
                    ctx.errors.push(ValidationError::new(
                        unevaluated_path,
                        location.into(),
                        ValidationErrorKind::UnevaluatedProperties {
                            unexpected: uncovered.iter().map(|key| (*key).clone()).collect(),
                        },
                    ));
                }
            } else {
                for key in uncovered {
                    let property_location = location.push(key.as_str());
                    let mut property_evaluated = Evaluated::default();
                    validate_schema(
                        ctx,
                        unevaluated_schema,
                        &unevaluated_path,
                        &map[key.as_str()],
                        &property_location,
                        &mut property_evaluated,
                    );
                    evaluated.properties.insert(key.clone());
                }
            }
        }
    }

    if let Some(unevaluated_schema) = schema.get("unevaluatedItems") {
        if let Value::Array(items) = instance {
            let unevaluated_path = schema_path.join("unevaluatedItems");
            let uncovered: Vec<usize> = (0..items.len())
                .filter(|index| !evaluated.items.contains(index))
                .collect();
            if let Value::Bool(false) = unevaluated_schema {
                if !uncovered.is_empty() {
                    ctx.errors.push(ValidationError::new(
                        unevaluated_path,
                        location.into(),
                        ValidationErrorKind::UnevaluatedItems {
                            unexpected: uncovered,
                        },
                    ));
                }
            } else {
                for index in uncovered {
                    let item_location = location.push(index);
                    let mut item_evaluated = Evaluated::default();
                    validate_schema(
                        ctx,
                        unevaluated_schema,
                        &unevaluated_path,
                        &items[index],
                        &item_location,
                        &mut item_evaluated,
                    );
                    evaluated.items.insert(index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"allOf": [{"type": "integer"}, {"minimum": 3}]}), &json!(4), true)]
    #[test_case(&json!({"allOf": [{"type": "integer"}, {"minimum": 3}]}), &json!(2), false)]
    #[test_case(&json!({"anyOf": [{"type": "string"}, {"type": "integer"}]}), &json!(4), true)]
    #[test_case(&json!({"anyOf": [{"type": "string"}, {"type": "integer"}]}), &json!(null), false)]
    #[test_case(&json!({"not": {"type": "string"}}), &json!(4), true)]
    #[test_case(&json!({"not": {"type": "string"}}), &json!("s"), false)]
    fn composition(schema: &Value, instance: &Value, expected: bool) {
        assert_eq!(tests_util::validate(schema, instance).valid, expected);
    }

    #[test_case(&json!(2), true; "matches the first branch only")]
    #[test_case(&json!(3), true; "matches the second branch only")]
    #[test_case(&json!(6), false; "matches both branches")]
    #[test_case(&json!(5), false; "matches neither branch")]
    fn one_of_requires_exactly_one(instance: &Value, expected: bool) {
        let schema = json!({"oneOf": [
            {"type": "integer", "multipleOf": 2},
            {"type": "integer", "multipleOf": 3},
        ]});
        assert_eq!(tests_util::validate(&schema, instance).valid, expected);
    }

    #[test]
    fn one_of_error_names_passing_branches() {
        let schema = json!({"oneOf": [
            {"type": "integer", "multipleOf": 2},
            {"type": "integer", "multipleOf": 3},
        ]});
        let errors = tests_util::validate(&schema, &json!(6)).errors;
        assert_eq!(errors[0].params(), json!({"passingSchemas": [0, 1]}));
    }

    #[test]
    fn any_of_emits_one_aggregate_error() {
        let errors = tests_util::validate(
            &json!({"anyOf": [{"type": "string"}, {"minimum": 10}]}),
            &json!(3),
        )
        .errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword(), "anyOf");
        assert_eq!(errors[0].schema_path.to_string(), "/anyOf");
    }

    #[test_case(&json!({"a": 1}), true; "condition met and then holds")]
    #[test_case(&json!({"a": "x"}), false; "condition met and then fails")]
    #[test_case(&json!({"b": 2}), true; "condition unmet and else holds")]
    #[test_case(&json!({"b": "x"}), false; "condition unmet and else fails")]
    fn conditionals(instance: &Value, expected: bool) {
        let schema = json!({
            "if": {"required": ["a"]},
            "then": {"properties": {"a": {"type": "integer"}}},
            "else": {"properties": {"b": {"type": "integer"}}},
        });
        assert_eq!(tests_util::validate(&schema, instance).valid, expected);
    }

    #[test]
    fn if_never_contributes_errors() {
        let errors = tests_util::validate(
            &json!({"if": {"type": "string"}}),
            &json!(42),
        )
        .errors;
        assert!(errors.is_empty());
    }

    #[test]
    fn unevaluated_properties_see_through_passing_branches() {
        let schema = json!({
            "allOf": [{"properties": {"from_all_of": true}}],
            "anyOf": [{"properties": {"from_any_of": true}}],
            "properties": {"own": true},
            "unevaluatedProperties": false,
        });
        tests_util::is_valid(
            &schema,
            &json!({"own": 1, "from_all_of": 2, "from_any_of": 3}),
        );
        let errors =
            tests_util::validate(&schema, &json!({"own": 1, "surprise": 2})).errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword(), "unevaluatedProperties");
        assert_eq!(errors[0].params(), json!({"unevaluatedProperties": ["surprise"]}));
    }

    #[test]
    fn all_of_properties_are_invisible_to_additional_properties() {
        // 2020-12 semantics: `additionalProperties` only sees its own node.
        let schema = json!({
            "allOf": [{"properties": {"nested": true}}],
            "additionalProperties": false,
        });
        let errors = tests_util::validate(&schema, &json!({"nested": 1})).errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword(), "additionalProperties");
    }

    #[test]
    fn unevaluated_items_cover_prefix_and_contains() {
        let schema = json!({
            "prefixItems": [{"type": "string"}],
            "contains": {"type": "integer"},
            "unevaluatedItems": false,
        });
        tests_util::is_valid(&schema, &json!(["id", 3]));
        let errors = tests_util::validate(&schema, &json!(["id", 3, true])).errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword(), "unevaluatedItems");
        assert_eq!(errors[0].params(), json!({"unevaluatedItems": [2]}));
    }

    #[test]
    fn unevaluated_properties_schema_validates_leftovers() {
        let schema = json!({
            "properties": {"a": true},
            "unevaluatedProperties": {"type": "integer"},
        });
        tests_util::is_valid(&schema, &json!({"a": "x", "b": 2}));
        let errors = tests_util::validate(&schema, &json!({"a": "x", "b": "y"})).errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].instance_path.to_string(), "/b");
    }
}
