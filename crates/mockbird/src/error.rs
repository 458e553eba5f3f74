//! Structured validation errors.
use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{json, Value};

use crate::{
    paths::JsonPointer,
    primitive_type::{PrimitiveType, PrimitiveTypeSet},
};

/// A single violated keyword.
///
/// Errors are ordered by schema traversal order (pre-order, applicator arms
/// in declaration order) and carry the minimal parameters a caller needs to
/// format an actionable message.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Path to the offending value inside the instance.
    pub instance_path: JsonPointer,
    /// Path to the violated keyword inside the schema, including applicator
    /// segments and `$ref`.
    pub schema_path: JsonPointer,
    /// What was violated, with parameters.
    pub kind: ValidationErrorKind,
    /// Optional fix-it guidance.
    pub suggestion: Option<String>,
}

/// Kinds of validation failures.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum ValidationErrorKind {
    /// Everything is invalid for a `false` schema.
    FalseSchema,
    /// A `$ref` could not be resolved.
    Ref { reference: String },
    /// The instance is missing entirely (not valid JSON).
    Undefined,
    /// The instance does not match the expected constant.
    Constant { expected: Value },
    /// The instance matches none of the enumerated options.
    Enum { options: Value },
    /// The instance has the wrong type.
    Type {
        expected: PrimitiveTypeSet,
        actual: PrimitiveType,
    },
    MinLength { limit: u64 },
    MaxLength { limit: u64 },
    /// The instance does not match the pattern, the pattern is invalid, or
    /// the guarded match was rejected.
    Pattern { pattern: String },
    Format { format: String },
    Minimum { limit: Value },
    Maximum { limit: Value },
    ExclusiveMinimum { limit: Value },
    ExclusiveMaximum { limit: Value },
    MultipleOf { multiple_of: f64 },
    MinItems { limit: u64 },
    MaxItems { limit: u64 },
    /// The array has equal elements at the two indexes.
    UniqueItems { first: usize, second: usize },
    Contains,
    MinContains { limit: u64, count: u64 },
    MaxContains { limit: u64, count: u64 },
    MinProperties { limit: u64 },
    MaxProperties { limit: u64 },
    Required { property: String },
    AdditionalProperties { unexpected: Vec<String> },
    PropertyNames { property: String },
    DependentRequired { property: String, dependency: String },
    /// No `anyOf` branch accepted the instance.
    AnyOf,
    /// No `oneOf` branch accepted the instance.
    OneOfNotValid,
    /// More than one `oneOf` branch accepted the instance.
    OneOfMultipleValid { passing: Vec<usize> },
    /// The negated schema accepted the instance.
    Not,
    UnevaluatedProperties { unexpected: Vec<String> },
    UnevaluatedItems { unexpected: Vec<usize> },
}

impl ValidationError {
    pub(crate) fn new(
        schema_path: JsonPointer,
        instance_path: JsonPointer,
        kind: ValidationErrorKind,
    ) -> ValidationError {
        ValidationError {
            instance_path,
            schema_path,
            kind,
            suggestion: None,
        }
    }

    pub(crate) fn with_suggestion(mut self, suggestion: impl Into<String>) -> ValidationError {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// The name of the violated keyword, as it appears in schemas. Boolean
    /// `false` schemas report the pseudo-keyword `"false"`; a missing
    /// instance reports `"type"`.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match &self.kind {
            ValidationErrorKind::FalseSchema => "false",
            ValidationErrorKind::Ref { .. } => "$ref",
            ValidationErrorKind::Undefined | ValidationErrorKind::Type { .. } => "type",
            ValidationErrorKind::Constant { .. } => "const",
            ValidationErrorKind::Enum { .. } => "enum",
            ValidationErrorKind::MinLength { .. } => "minLength",
            ValidationErrorKind::MaxLength { .. } => "maxLength",
            ValidationErrorKind::Pattern { .. } => "pattern",
            ValidationErrorKind::Format { .. } => "format",
            ValidationErrorKind::Minimum { .. } => "minimum",
            ValidationErrorKind::Maximum { .. } => "maximum",
            ValidationErrorKind::ExclusiveMinimum { .. } => "exclusiveMinimum",
            ValidationErrorKind::ExclusiveMaximum { .. } => "exclusiveMaximum",
            ValidationErrorKind::MultipleOf { .. } => "multipleOf",
            ValidationErrorKind::MinItems { .. } => "minItems",
            ValidationErrorKind::MaxItems { .. } => "maxItems",
            ValidationErrorKind::UniqueItems { .. } => "uniqueItems",
            ValidationErrorKind::Contains => "contains",
            ValidationErrorKind::MinContains { .. } => "minContains",
            ValidationErrorKind::MaxContains { .. } => "maxContains",
            ValidationErrorKind::MinProperties { .. } => "minProperties",
            ValidationErrorKind::MaxProperties { .. } => "maxProperties",
            ValidationErrorKind::Required { .. } => "required",
            ValidationErrorKind::AdditionalProperties { .. } => "additionalProperties",
            ValidationErrorKind::PropertyNames { .. } => "propertyNames",
            ValidationErrorKind::DependentRequired { .. } => "dependentRequired",
            ValidationErrorKind::AnyOf => "anyOf",
            ValidationErrorKind::OneOfNotValid
            | ValidationErrorKind::OneOfMultipleValid { .. } => "oneOf",
            ValidationErrorKind::Not => "not",
            ValidationErrorKind::UnevaluatedProperties { .. } => "unevaluatedProperties",
            ValidationErrorKind::UnevaluatedItems { .. } => "unevaluatedItems",
        }
    }

    /// Keyword parameters as a JSON object.
    #[must_use]
    pub fn params(&self) -> Value {
        match &self.kind {
            ValidationErrorKind::FalseSchema
            | ValidationErrorKind::Undefined
            | ValidationErrorKind::Contains
            | ValidationErrorKind::AnyOf
            | ValidationErrorKind::OneOfNotValid
            | ValidationErrorKind::Not => json!({}),
            ValidationErrorKind::Ref { reference } => json!({ "ref": reference }),
            ValidationErrorKind::Constant { expected } => json!({ "allowedValue": expected }),
            ValidationErrorKind::Enum { options } => json!({ "allowedValues": options }),
            ValidationErrorKind::Type { expected, actual } => json!({
                "expected": expected.iter().map(|t| t.to_string()).collect::<Vec<_>>(),
                "actual": actual.to_string(),
            }),
            ValidationErrorKind::MinLength { limit } => json!({ "limit": limit }),
            ValidationErrorKind::MaxLength { limit } => json!({ "limit": limit }),
            ValidationErrorKind::Pattern { pattern } => json!({ "pattern": pattern }),
            ValidationErrorKind::Format { format } => json!({ "format": format }),
            ValidationErrorKind::Minimum { limit } => {
                json!({ "limit": limit, "comparison": ">=" })
            }
            ValidationErrorKind::Maximum { limit } => {
                json!({ "limit": limit, "comparison": "<=" })
            }
            ValidationErrorKind::ExclusiveMinimum { limit } => {
                json!({ "limit": limit, "comparison": ">" })
            }
            ValidationErrorKind::ExclusiveMaximum { limit } => {
                json!({ "limit": limit, "comparison": "<" })
            }
            ValidationErrorKind::MultipleOf { multiple_of } => {
                json!({ "multipleOf": multiple_of })
            }
            ValidationErrorKind::MinItems { limit } => json!({ "limit": limit }),
            ValidationErrorKind::MaxItems { limit } => json!({ "limit": limit }),
            ValidationErrorKind::UniqueItems { first, second } => {
                json!({ "i": first, "j": second })
            }
            ValidationErrorKind::MinContains { limit, count } => {
                json!({ "limit": limit, "count": count })
            }
            ValidationErrorKind::MaxContains { limit, count } => {
                json!({ "limit": limit, "count": count })
            }
            ValidationErrorKind::MinProperties { limit } => json!({ "limit": limit }),
            ValidationErrorKind::MaxProperties { limit } => json!({ "limit": limit }),
            ValidationErrorKind::Required { property } => {
                json!({ "missingProperty": property })
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                json!({ "additionalProperties": unexpected })
            }
            ValidationErrorKind::PropertyNames { property } => {
                json!({ "propertyName": property })
            }
            ValidationErrorKind::DependentRequired {
                property,
                dependency,
            } => json!({ "property": property, "missingProperty": dependency }),
            ValidationErrorKind::OneOfMultipleValid { passing } => {
                json!({ "passingSchemas": passing })
            }
            ValidationErrorKind::UnevaluatedProperties { unexpected } => {
                json!({ "unevaluatedProperties": unexpected })
            }
            ValidationErrorKind::UnevaluatedItems { unexpected } => {
                json!({ "unevaluatedItems": unexpected })
            }
        }
    }
}

impl fmt::Display for ValidationError {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValidationErrorKind::FalseSchema => f.write_str("false schema matches nothing"),
            ValidationErrorKind::Ref { reference } => {
                write!(f, "reference '{reference}' cannot be resolved")
            }
            ValidationErrorKind::Undefined => f.write_str("instance is not defined"),
            ValidationErrorKind::Constant { expected } => {
                write!(f, "must be equal to the constant {expected}")
            }
            ValidationErrorKind::Enum { options } => {
                write!(f, "must be one of {options}")
            }
            ValidationErrorKind::Type { expected, actual } => {
                let mut expected = expected.iter();
                let first = expected.next();
                match (first, expected.next()) {
                    (Some(single), None) => {
                        write!(f, "must be of type {single}, found {actual}")
                    }
                    (Some(first), Some(second)) => {
                        write!(f, "must be of type {first} or {second}")?;
                        for next in expected {
                            write!(f, " or {next}")?;
                        }
                        write!(f, ", found {actual}")
                    }
                    _ => write!(f, "type set is empty, found {actual}"),
                }
            }
            ValidationErrorKind::MinLength { limit } => {
                write!(f, "must be at least {limit} characters long")
            }
            ValidationErrorKind::MaxLength { limit } => {
                write!(f, "must be at most {limit} characters long")
            }
            ValidationErrorKind::Pattern { pattern } => {
                write!(f, "must match pattern '{pattern}'")
            }
            ValidationErrorKind::Format { format } => {
                write!(f, "must match format '{format}'")
            }
            ValidationErrorKind::Minimum { limit } => write!(f, "must be >= {limit}"),
            ValidationErrorKind::Maximum { limit } => write!(f, "must be <= {limit}"),
            ValidationErrorKind::ExclusiveMinimum { limit } => write!(f, "must be > {limit}"),
            ValidationErrorKind::ExclusiveMaximum { limit } => write!(f, "must be < {limit}"),
            ValidationErrorKind::MultipleOf { multiple_of } => {
                write!(f, "must be a multiple of {multiple_of}")
            }
            ValidationErrorKind::MinItems { limit } => {
                write!(f, "must have at least {limit} items")
            }
            ValidationErrorKind::MaxItems { limit } => {
                write!(f, "must have at most {limit} items")
            }
            ValidationErrorKind::UniqueItems { first, second } => {
                write!(f, "items at {first} and {second} are equal")
            }
            ValidationErrorKind::Contains => {
                f.write_str("no item matches the 'contains' schema")
            }
            ValidationErrorKind::MinContains { limit, count } => write!(
                f,
                "only {count} items match the 'contains' schema, {limit} required"
            ),
            ValidationErrorKind::MaxContains { limit, count } => write!(
                f,
                "{count} items match the 'contains' schema, at most {limit} allowed"
            ),
            ValidationErrorKind::MinProperties { limit } => {
                write!(f, "must have at least {limit} properties")
            }
            ValidationErrorKind::MaxProperties { limit } => {
                write!(f, "must have at most {limit} properties")
            }
            ValidationErrorKind::Required { property } => {
                write!(f, "required property '{property}' is missing")
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                write!(f, "additional properties are not allowed (")?;
                let mut first = true;
                for property in unexpected {
                    if !first {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{property}'")?;
                    first = false;
                }
                f.write_str(" unexpected)")
            }
            ValidationErrorKind::PropertyNames { property } => {
                write!(f, "property name '{property}' is invalid")
            }
            ValidationErrorKind::DependentRequired {
                property,
                dependency,
            } => write!(
                f,
                "property '{dependency}' is required when '{property}' is present"
            ),
            ValidationErrorKind::AnyOf => {
                f.write_str("does not match any of the schemas in 'anyOf'")
            }
            ValidationErrorKind::OneOfNotValid => {
                f.write_str("does not match any of the schemas in 'oneOf'")
            }
            ValidationErrorKind::OneOfMultipleValid { passing } => {
                write!(f, "matches more than one schema in 'oneOf' ({passing:?})")
            }
            ValidationErrorKind::Not => f.write_str("must not match the schema in 'not'"),
            ValidationErrorKind::UnevaluatedProperties { unexpected } => {
                write!(f, "unevaluated properties are not allowed ({unexpected:?})")
            }
            ValidationErrorKind::UnevaluatedItems { unexpected } => {
                write!(f, "unevaluated items are not allowed at {unexpected:?}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl Serialize for ValidationError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut record = serializer.serialize_struct("ValidationError", 6)?;
        record.serialize_field("instancePath", &self.instance_path)?;
        record.serialize_field("schemaPath", &self.schema_path)?;
        record.serialize_field("keyword", self.keyword())?;
        record.serialize_field("message", &self.to_string())?;
        record.serialize_field("params", &self.params())?;
        match &self.suggestion {
            Some(suggestion) => record.serialize_field("suggestion", suggestion)?,
            None => record.skip_field("suggestion")?,
        }
        record.end()
    }
}

/// The outcome of one validation call.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ValidationOutput {
    /// `true` iff `errors` is empty.
    pub valid: bool,
    /// Violations in schema traversal order.
    pub errors: Vec<ValidationError>,
}

impl ValidationOutput {
    pub(crate) fn from_errors(errors: Vec<ValidationError>) -> ValidationOutput {
        ValidationOutput {
            valid: errors.is_empty(),
            errors,
        }
    }
}
