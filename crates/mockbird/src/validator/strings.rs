//! String assertions: `minLength`, `maxLength`, `pattern`, `format`.
//!
//! Lengths count grapheme clusters, so `"é"` spelled as `e` + combining
//! acute has length 1.
use serde_json::{Map, Value};
use unicode_segmentation::UnicodeSegmentation;

use super::{formats, ValidatorContext};
use crate::{
    error::{ValidationError, ValidationErrorKind},
    paths::{InstanceLocation, JsonPointer},
};

pub(super) fn validate(
    ctx: &mut ValidatorContext<'_>,
    schema: &Map<String, Value>,
    schema_path: &JsonPointer,
    instance: &str,
    location: &InstanceLocation<'_, '_>,
) {
    let length = if schema.contains_key("minLength") || schema.contains_key("maxLength") {
        Some(instance.graphemes(true).count() as u64)
    } else {
        None
    };

    if let (Some(limit), Some(length)) = (schema.get("minLength").and_then(Value::as_u64), length)
    {
        if length < limit {
            ctx.errors.push(ValidationError::new(
                schema_path.join("minLength"),
                location.into(),
                ValidationErrorKind::MinLength { limit },
            ));
        }
    }
    if let (Some(limit), Some(length)) = (schema.get("maxLength").and_then(Value::as_u64), length)
    {
        if length > limit {
            ctx.errors.push(ValidationError::new(
                schema_path.join("maxLength"),
                location.into(),
                ValidationErrorKind::MaxLength { limit },
            ));
        }
    }

    if let Some(Value::String(pattern)) = schema.get("pattern") {
        let max_haystack = ctx.max_regex_haystack();
        let matched = match ctx.regex_cache.get(pattern) {
            Ok(regex) => regex.is_match(instance, max_haystack).unwrap_or(false),
            // Invalid patterns fail the keyword, never pass silently.
            Err(_) => false,
        };
        if !matched {
            ctx.errors.push(ValidationError::new(
                schema_path.join("pattern"),
                location.into(),
                ValidationErrorKind::Pattern {
                    pattern: pattern.clone(),
                },
            ));
        }
    }

    if ctx.options.validate_formats {
        if let Some(Value::String(format)) = schema.get("format") {
            if !formats::is_valid(format, instance) {
                ctx.errors.push(ValidationError::new(
                    schema_path.join("format"),
                    location.into(),
                    ValidationErrorKind::Format {
                        format: format.clone(),
                    },
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

    #[test_case(&json!({"minLength": 3}), &json!("abc"))]
    #[test_case(&json!({"maxLength": 3}), &json!("abc"))]
    #[test_case(&json!({"minLength": 1, "maxLength": 1}), &json!("e\u{301}"); "grapheme cluster counts once")]
    #[test_case(&json!({"pattern": "^a+$"}), &json!("aaa"))]
    #[test_case(&json!({"minLength": 3}), &json!(12); "non strings are ignored")]
    fn valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance);
    }

    #[test_case(&json!({"minLength": 4}), &json!("abc"), "minLength")]
    #[test_case(&json!({"maxLength": 2}), &json!("abc"), "maxLength")]
    #[test_case(&json!({"pattern": "^a+$"}), &json!("b"), "pattern")]
    #[test_case(&json!({"pattern": "(unclosed"}), &json!("anything"), "pattern"; "invalid pattern fails")]
    #[test_case(&json!({"pattern": "^\\w+$"}), &json!("café"), "pattern"; "word class is ascii under ecma semantics")]
    fn invalid(schema: &Value, instance: &Value, keyword: &str) {
        let errors = tests_util::validate(schema, instance).errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword(), keyword);
    }

    #[test]
    fn formats_are_annotations_unless_enabled() {
        let schema = json!({"format": "ipv4"});
        tests_util::is_valid(&schema, &json!("not-an-ip"));
        let errors = tests_util::validate_formats(&schema, &json!("not-an-ip")).errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].keyword(), "format");
    }

    #[test]
    fn overlong_haystack_fails_the_pattern_keyword() {
        let registry = referencing::Registry::new(json!({"pattern": "a+"}));
        let options = crate::ValidatorOptions::new().max_regex_haystack(8);
        let instance = json!("a".repeat(64));
        let output =
            crate::validator::validate_with(&registry, "#", Some(&instance), &options);
        assert!(!output.valid);
        assert_eq!(output.errors[0].keyword(), "pattern");
    }
}
