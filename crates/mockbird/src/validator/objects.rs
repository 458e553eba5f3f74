//! Object assertions: sizes, `required`, property applicators, dependents.
use ahash::AHashSet;
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
    whole: &Value,
    instance: &Map<String, Value>,
    location: &InstanceLocation<'_, '_>,
    evaluated: &mut Evaluated,
) {
    if let Some(limit) = schema.get("minProperties").and_then(Value::as_u64) {
        if (instance.len() as u64) < limit {
            ctx.errors.push(ValidationError::new(
                schema_path.join("minProperties"),
                location.into(),
                ValidationErrorKind::MinProperties { limit },
            ));
        }
    }
    if let Some(limit) = schema.get("maxProperties").and_then(Value::as_u64) {
        if (instance.len() as u64) > limit {
            ctx.errors.push(ValidationError::new(
                schema_path.join("maxProperties"),
                location.into(),
                ValidationErrorKind::MaxProperties { limit },
            ));
        }
    }

    if let Some(Value::Array(required)) = schema.get("required") {
        for property in required {
            if let Value::String(property) = property {
                if !instance.contains_key(property) {
                    ctx.errors.push(ValidationError::new(
                        schema_path.join("required"),
                        location.into(),
                        ValidationErrorKind::Required {
                            property: property.clone(),
                        },
                    ));
                }
            }
        }
    }

    // Keys examined by `properties` or `patternProperties` on this node;
    // `additionalProperties` sees only the complement.
    let mut covered: AHashSet<&str> = AHashSet::new();

    if let Some(Value::Object(properties)) = schema.get("properties") {
        let properties_path = schema_path.join("properties");
        for (property, subschema) in properties {
            if let Some(value) = instance.get(property) {
                let property_location = location.push(property.as_str());
                let mut property_evaluated = Evaluated::default();
                validate_schema(
                    ctx,
                    subschema,
                    &properties_path.join(property.clone()),
                    value,
                    &property_location,
                    &mut property_evaluated,
                );
                covered.insert(property);
                evaluated.properties.insert(property.clone());
            }
        }
    }

    if let Some(Value::Object(patterns)) = schema.get("patternProperties") {
        let patterns_path = schema_path.join("patternProperties");
        for (pattern, subschema) in patterns {
            let max_haystack = ctx.max_regex_haystack();
            let matches: Result<Vec<&str>, ()> = {
                match ctx.regex_cache.get(pattern) {
                    Ok(regex) => instance
                        .keys()
                        .map(|key| {
                            regex
                                .is_match(key, max_haystack)
                                .map(|matched| if matched { Some(key.as_str()) } else { None })
                                .map_err(|_| ())
                        })
                        .filter_map(Result::transpose)
                        .collect(),
                    Err(_) => Err(()),
                }
            };
            match matches {
                Ok(matched_keys) => {
                    let pattern_path = patterns_path.join(pattern.clone());
                    for key in matched_keys {
                        let value = &instance[key];
                        let property_location = location.push(key);
                        let mut property_evaluated = Evaluated::default();
                        validate_schema(
                            ctx,
                            subschema,
                            &pattern_path,
                            value,
                            &property_location,
                            &mut property_evaluated,
                        );
                        covered.insert(key);
                        evaluated.properties.insert(key.to_string());
                    }
                }
                // Invalid pattern or guarded-out haystack fails the keyword.
                Err(()) => {
                    ctx.errors.push(ValidationError::new(
                        patterns_path.join(pattern.clone()),
                        location.into(),
                        ValidationErrorKind::Pattern {
                            pattern: pattern.clone(),
                        },
                    ));
                }
            }
        }
    }

    if let Some(additional) = schema.get("additionalProperties") {
        let additional_path = schema_path.join("additionalProperties");
        let extra: Vec<&String> = instance
            .keys()
            .filter(|key| !covered.contains(key.as_str()))
            .collect();
        if let Value::Bool(false) = additional {
            if !extra.is_empty() {
                ctx.errors.push(ValidationError::new(
                    additional_path,
                    location.into(),
                    ValidationErrorKind::AdditionalProperties {
                        unexpected: extra.iter().map(|key| (*key).clone()).collect(),
                    },
                ));
            }
        } else {
            for key in extra {
                let property_location = location.push(key.as_str());
                let mut property_evaluated = Evaluated::default();
                validate_schema(
                    ctx,
                    additional,
                    &additional_path,
                    &instance[key.as_str()],
                    &property_location,
                    &mut property_evaluated,
                );
                evaluated.properties.insert(key.clone());
            }
        }
    }

    if let Some(names_schema) = schema.get("propertyNames") {
        let names_path = schema_path.join("propertyNames");
        for property in instance.keys() {
            let name = Value::String(property.clone());
            let mut name_evaluated = Evaluated::default();
            if !ctx.probe(names_schema, &names_path, &name, location, &mut name_evaluated) {
                ctx.errors.push(ValidationError::new(
                    names_path.clone(),
                    location.into(),
                    ValidationErrorKind::PropertyNames {
                        property: property.clone(),
                    },
                ));
            }
        }
    }

    if let Some(Value::Object(dependents)) = schema.get("dependentRequired") {
        for (property, dependencies) in dependents {
            if !instance.contains_key(property) {
                continue;
            }
            if let Value::Array(dependencies) = dependencies {
                for dependency in dependencies {
                    if let Value::String(dependency) = dependency {
                        if !instance.contains_key(dependency) {
                            ctx.errors.push(ValidationError::new(
                                schema_path.join("dependentRequired"),
                                location.into(),
                                ValidationErrorKind::DependentRequired {
                                    property: property.clone(),
                                    dependency: dependency.clone(),
                                },
                            ));
                        }
                    }
                }
            }
        }
    }

    if let Some(Value::Object(dependents)) = schema.get("dependentSchemas") {
        let dependents_path = schema_path.join("dependentSchemas");
        for (property, subschema) in dependents {
            if !instance.contains_key(property) {
                continue;
            }
            let before = ctx.errors.len();
            let mut dependent_evaluated = Evaluated::default();
            validate_schema(
                ctx,
                subschema,
                &dependents_path.join(property.clone()),
                whole,
                location,
                &mut dependent_evaluated,
            );
            if ctx.errors.len() == before {
                evaluated.union(&dependent_evaluated);
            }
        }
    }
}
