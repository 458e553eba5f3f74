//! Instance validation: a pure tree walk of schema against instance.
//!
//! Schemas are addressed by pointer through the registry; `$ref` recursion is
//! broken with a per-call visited set, so cyclic documents validate without
//! guards at the call site.
mod applicators;
mod arrays;
pub(crate) mod formats;
mod numbers;
mod objects;
mod strings;

use ahash::AHashSet;
use referencing::Registry;
use serde_json::Value;

use crate::{
    error::{ValidationError, ValidationErrorKind, ValidationOutput},
    paths::{InstanceLocation, JsonPointer},
    primitive_type::{PrimitiveType, PrimitiveTypeSet},
    regex::{RegexCache, DEFAULT_MAX_HAYSTACK},
};

/// Configuration for a validation call.
#[derive(Debug, Clone)]
pub struct ValidatorOptions {
    validate_formats: bool,
    max_regex_haystack: usize,
}

impl ValidatorOptions {
    #[must_use]
    pub fn new() -> ValidatorOptions {
        ValidatorOptions {
            validate_formats: false,
            max_regex_haystack: DEFAULT_MAX_HAYSTACK,
        }
    }

    /// Enforce `format` as an assertion. Off by default, matching 2020-12
    /// annotation semantics.
    #[must_use]
    pub fn validate_formats(mut self, enabled: bool) -> ValidatorOptions {
        self.validate_formats = enabled;
        self
    }

    /// Ceiling on the length of strings handed to regex matching; longer
    /// instances fail the owning keyword.
    #[must_use]
    pub fn max_regex_haystack(mut self, limit: usize) -> ValidatorOptions {
        self.max_regex_haystack = limit;
        self
    }
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        ValidatorOptions::new()
    }
}

/// Validate an instance against the schema at `pointer`.
///
/// `None` stands for a missing instance (for example an absent request body)
/// and fails with a single `type` error.
#[must_use]
pub fn validate(registry: &Registry, pointer: &str, instance: Option<&Value>) -> ValidationOutput {
    validate_with(registry, pointer, instance, &ValidatorOptions::new())
}

/// [`validate`] with explicit options.
#[must_use]
pub fn validate_with(
    registry: &Registry,
    pointer: &str,
    instance: Option<&Value>,
    options: &ValidatorOptions,
) -> ValidationOutput {
    let mut ctx = ValidatorContext::new(registry, options);
    let schema_path = JsonPointer::parse(pointer);
    let location = InstanceLocation::new();
    let Some(instance) = instance else {
        ctx.errors.push(ValidationError::new(
            schema_path,
            JsonPointer::default(),
            ValidationErrorKind::Undefined,
        ));
        return ValidationOutput::from_errors(ctx.errors);
    };
    match registry.get(pointer) {
        Some(schema) => {
            let mut evaluated = Evaluated::default();
            validate_schema(
                &mut ctx,
                schema.raw(),
                &schema_path,
                instance,
                &location,
                &mut evaluated,
            );
        }
        None => {
            let mut error = ValidationError::new(
                schema_path,
                JsonPointer::default(),
                ValidationErrorKind::Ref {
                    reference: pointer.to_string(),
                },
            );
            if let Some(source) = registry.resolution_error(pointer) {
                if let Some(suggestion) = source.suggestion() {
                    error = error.with_suggestion(suggestion);
                }
            }
            ctx.errors.push(error);
        }
    }
    ValidationOutput::from_errors(ctx.errors)
}

/// Boolean convenience form of [`validate`].
#[must_use]
pub fn is_valid(registry: &Registry, pointer: &str, instance: &Value) -> bool {
    validate(registry, pointer, Some(instance)).valid
}

/// Properties and array indexes already examined at the current instance
/// location, the domain complement of `unevaluated*`.
#[derive(Debug, Default, Clone)]
pub(crate) struct Evaluated {
    pub(crate) properties: AHashSet<String>,
    pub(crate) items: AHashSet<usize>,
}

impl Evaluated {
    pub(crate) fn union(&mut self, other: &Evaluated) {
        self.properties
            .extend(other.properties.iter().cloned());
        self.items.extend(other.items.iter().copied());
    }
}

pub(crate) struct ValidatorContext<'r> {
    pub(crate) registry: &'r Registry,
    pub(crate) options: &'r ValidatorOptions,
    pub(crate) errors: Vec<ValidationError>,
    pub(crate) regex_cache: RegexCache,
    visited_refs: Vec<String>,
}

impl<'r> ValidatorContext<'r> {
    fn new(registry: &'r Registry, options: &'r ValidatorOptions) -> ValidatorContext<'r> {
        ValidatorContext {
            registry,
            options,
            errors: Vec::new(),
            regex_cache: RegexCache::default(),
            visited_refs: Vec::new(),
        }
    }

    pub(crate) fn max_regex_haystack(&self) -> usize {
        self.options.max_regex_haystack
    }

    /// Run a subschema without letting its errors reach the caller's buffer.
    /// Returns whether the branch passed; `evaluated` receives the branch's
    /// annotations either way (callers union it only on success).
    pub(crate) fn probe(
        &mut self,
        schema: &Value,
        schema_path: &JsonPointer,
        instance: &Value,
        location: &InstanceLocation<'_, '_>,
        evaluated: &mut Evaluated,
    ) -> bool {
        let outer = std::mem::take(&mut self.errors);
        validate_schema(self, schema, schema_path, instance, location, evaluated);
        let passed = self.errors.is_empty();
        self.errors = outer;
        passed
    }
}

/// The recursive walk. Rule order: boolean schemas, `$ref` (with sibling
/// keywords still applied), `const`, `enum`, `type`, type-gated assertions,
/// composition applicators, conditionals, `unevaluated*`.
pub(crate) fn validate_schema(
    ctx: &mut ValidatorContext<'_>,
    schema: &Value,
    schema_path: &JsonPointer,
    instance: &Value,
    location: &InstanceLocation<'_, '_>,
    evaluated: &mut Evaluated,
) {
    let object = match schema {
        Value::Bool(true) => return,
        Value::Bool(false) => {
            ctx.errors.push(ValidationError::new(
                schema_path.clone(),
                location.into(),
                ValidationErrorKind::FalseSchema,
            ));
            return;
        }
        Value::Object(object) => object,
        // Non-schema values at schema positions constrain nothing.
        _ => return,
    };

    if let Some(Value::String(reference)) = object.get("$ref") {
        let resolved = ref_target(ctx, reference);
        match resolved {
            RefResolution::Cycle => {}
            RefResolution::Schema(target) => {
                ctx.visited_refs.push(reference.clone());
                let ref_path = schema_path.join("$ref");
                validate_schema(ctx, target.raw(), &ref_path, instance, location, evaluated);
                ctx.visited_refs.pop();
            }
            RefResolution::Unresolved => {
                let mut error = ValidationError::new(
                    schema_path.join("$ref"),
                    location.into(),
                    ValidationErrorKind::Ref {
                        reference: reference.clone(),
                    },
                );
                if let Some(source) = ctx.registry.resolution_error(reference) {
                    if let Some(suggestion) = source.suggestion() {
                        error = error.with_suggestion(suggestion);
                    }
                }
                ctx.errors.push(error);
                return;
            }
        }
    }

    if let Some(expected) = object.get("const") {
        if !crate::equality::equal(instance, expected) {
            ctx.errors.push(ValidationError::new(
                schema_path.join("const"),
                location.into(),
                ValidationErrorKind::Constant {
                    expected: expected.clone(),
                },
            ));
        }
    }

    if let Some(Value::Array(options)) = object.get("enum") {
        if !options
            .iter()
            .any(|option| crate::equality::equal(instance, option))
        {
            ctx.errors.push(ValidationError::new(
                schema_path.join("enum"),
                location.into(),
                ValidationErrorKind::Enum {
                    options: Value::Array(options.clone()),
                },
            ));
        }
    }

    if let Some(type_value) = object.get("type") {
        validate_type(ctx, type_value, schema_path, instance, location);
    }

    match instance {
        Value::String(value) => strings::validate(ctx, object, schema_path, value, location),
        Value::Number(value) => numbers::validate(ctx, object, schema_path, value, location),
        Value::Array(items) => {
            arrays::validate(ctx, object, schema_path, items, location, evaluated);
        }
        Value::Object(map) => {
            objects::validate(ctx, object, schema_path, instance, map, location, evaluated);
        }
        _ => {}
    }

    applicators::validate(ctx, object, schema_path, instance, location, evaluated);
}

fn validate_type(
    ctx: &mut ValidatorContext<'_>,
    type_value: &Value,
    schema_path: &JsonPointer,
    instance: &Value,
    location: &InstanceLocation<'_, '_>,
) {
    let mut expected = PrimitiveTypeSet::new();
    match type_value {
        Value::String(name) => {
            if let Ok(primitive_type) = PrimitiveType::try_from(name.as_str()) {
                expected |= primitive_type;
            } else {
                return;
            }
        }
        Value::Array(names) => {
            for name in names {
                if let Some(Ok(primitive_type)) =
                    name.as_str().map(PrimitiveType::try_from)
                {
                    expected |= primitive_type;
                }
            }
        }
        _ => return,
    }
    let actual = PrimitiveType::from(instance);
    if !expected.admits(actual) {
        ctx.errors.push(ValidationError::new(
            schema_path.join("type"),
            location.into(),
            ValidationErrorKind::Type { expected, actual },
        ));
    }
}

enum RefResolution {
    Cycle,
    Schema(std::sync::Arc<referencing::ProcessedSchema>),
    Unresolved,
}

fn ref_target(ctx: &ValidatorContext<'_>, reference: &str) -> RefResolution {
    if ctx.visited_refs.iter().any(|visited| visited == reference) {
        return RefResolution::Cycle;
    }
    match ctx.registry.resolve_ref(reference) {
        Some(target) => RefResolution::Schema(target),
        None => RefResolution::Unresolved,
    }
}
