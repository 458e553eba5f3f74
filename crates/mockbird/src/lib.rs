//! A JSON Schema 2020-12 engine for OpenAPI mock servers.
//!
//! Three coupled jobs over one immutable document:
//!
//! - build the complete `$ref` topology with a cycle census ([`Registry`]);
//! - validate instances against any sub-schema addressed by JSON Pointer;
//! - generate plausible, deterministic mock instances for any sub-schema.
//!
//! # Validation
//!
//! ```rust
//! use serde_json::json;
//! use mockbird::Registry;
//!
//! let registry = Registry::new(json!({
//!     "components": {
//!         "schemas": {
//!             "User": {
//!                 "type": "object",
//!                 "properties": {"id": {"type": "integer", "minimum": 1}},
//!                 "required": ["id"],
//!             }
//!         }
//!     }
//! }));
//!
//! let good = mockbird::validate(&registry, "#/components/schemas/User", Some(&json!({"id": 7})));
//! assert!(good.valid);
//!
//! let bad = mockbird::validate(&registry, "#/components/schemas/User", Some(&json!({"id": 0})));
//! assert!(!bad.valid);
//! assert_eq!(bad.errors[0].keyword(), "minimum");
//! assert_eq!(bad.errors[0].instance_path.to_string(), "/id");
//! ```
//!
//! # Generation
//!
//! Output is deterministic per seed; the RNG is re-seeded on every call.
//!
//! ```rust
//! use serde_json::json;
//! use mockbird::{Generator, GeneratorOptions, Registry};
//!
//! let registry = Registry::new(json!({
//!     "type": "object",
//!     "properties": {"name": {"type": "string", "minLength": 3}},
//!     "required": ["name"],
//! }));
//! let generator = Generator::with_options(&registry, GeneratorOptions::new().seed(42));
//! assert_eq!(generator.generate("#"), generator.generate("#"));
//! ```
//!
//! # Reference cycles
//!
//! Cyclic schemas are first-class: the registry records them at construction
//! and both the validator and the generator short-circuit on revisited refs.
//!
//! ```rust
//! use serde_json::json;
//! use mockbird::Registry;
//!
//! let registry = Registry::new(json!({"$ref": "#"}));
//! assert!(registry.is_cyclic("#"));
//! assert!(mockbird::is_valid(&registry, "#", &json!({})));
//! ```
mod equality;
mod error;
mod generator;
pub mod paths;
mod primitive_type;
mod regex;
mod validator;

pub use error::{ValidationError, ValidationErrorKind, ValidationOutput};
pub use generator::{Generator, GeneratorOptions};
pub use primitive_type::{PrimitiveType, PrimitiveTypeSet};
pub use referencing::{
    classify, Error as RefError, ProcessedSchema, RefGraph, RefTarget, Registry,
};
pub use validator::{is_valid, validate, validate_with, ValidatorOptions};

use serde_json::Value;

/// Generate a mock value for the schema at `pointer` with default options
/// (`max_depth = 10`, `seed = 0`).
#[must_use]
pub fn generate(registry: &Registry, pointer: &str) -> Value {
    Generator::new(registry).generate(pointer)
}

#[cfg(test)]
pub(crate) mod tests_util {
    use referencing::Registry;
    use serde_json::Value;

    use crate::{validator, ValidationOutput, ValidatorOptions};

    pub(crate) fn validate(schema: &Value, instance: &Value) -> ValidationOutput {
        let registry = Registry::new(schema.clone());
        validator::validate(&registry, "#", Some(instance))
    }

    pub(crate) fn validate_formats(schema: &Value, instance: &Value) -> ValidationOutput {
        let registry = Registry::new(schema.clone());
        validator::validate_with(
            &registry,
            "#",
            Some(instance),
            &ValidatorOptions::new().validate_formats(true),
        )
    }

    pub(crate) fn is_valid(schema: &Value, instance: &Value) {
        let output = validate(schema, instance);
        assert!(
            output.valid,
            "{schema} should accept {instance}, errors: {:?}",
            output.errors
        );
    }
}
