//! End-to-end scenarios driving the registry, validator, and generator
//! together, the way the mock server uses them.
use mockbird::{Generator, GeneratorOptions, Registry};
use serde_json::{json, Value};
use test_case::test_case;

fn openapi_document() -> Value {
    json!({
        "openapi": "3.1.0",
        "components": {
            "schemas": {
                "Base": {
                    "type": "object",
                    "properties": {"token": {"type": "string"}},
                    "required": ["token"],
                },
                "Child": {
                    "allOf": [
                        {"$ref": "#/components/schemas/Base"},
                        {"properties": {"family": {"type": "string"}}, "required": ["family"]},
                    ],
                },
                "User": {
                    "type": "object",
                    "properties": {
                        "id": {"type": "integer", "minimum": 1, "maximum": 1000000},
                        "name": {"type": "string", "minLength": 5, "maxLength": 20},
                    },
                    "required": ["id", "name"],
                },
                "Tree": {
                    "type": "object",
                    "properties": {
                        "value": {"type": "integer"},
                        "children": {
                            "type": "array",
                            "items": {"$ref": "#/components/schemas/Tree"},
                        },
                    },
                    "required": ["value"],
                },
            }
        }
    })
}

#[test]
fn self_reference_cycle_is_recorded_and_validates() {
    let registry = Registry::new(json!({"$ref": "#"}));
    assert!(registry.ref_graph().cyclic_refs().contains("#"));
    let output = mockbird::validate(&registry, "#", Some(&json!({})));
    assert!(output.valid);
}

#[test]
fn mutual_defs_cycle_is_recorded() {
    let registry = Registry::new(json!({
        "$defs": {
            "A": {"$ref": "#/$defs/B"},
            "B": {"$ref": "#/$defs/A"},
        },
        "$ref": "#/$defs/A",
    }));
    let cyclic = registry.ref_graph().cyclic_refs();
    assert!(cyclic.contains("#/$defs/A"));
    assert!(cyclic.contains("#/$defs/B"));
    assert!(mockbird::is_valid(&registry, "#", &json!("anything")));
}

#[test_case(&json!(2), true; "multiple of two only")]
#[test_case(&json!(3), true; "multiple of three only")]
#[test_case(&json!(6), false; "multiple of both")]
#[test_case(&json!(5), false; "multiple of neither")]
fn one_of_exactly_one(instance: &Value, expected: bool) {
    let registry = Registry::new(json!({
        "oneOf": [
            {"type": "integer", "multipleOf": 2},
            {"type": "integer", "multipleOf": 3},
        ]
    }));
    assert_eq!(
        mockbird::validate(&registry, "#", Some(instance)).valid,
        expected
    );
}

#[test]
fn any_of_string_or_null_generates_a_string() {
    let registry = Registry::new(json!({
        "anyOf": [{"type": "string"}, {"type": "null"}]
    }));
    for seed in 0..16 {
        let generated =
            Generator::with_options(&registry, GeneratorOptions::new().seed(seed)).generate("#");
        assert!(generated.is_string(), "seed {seed} produced {generated}");
    }
}

#[test]
fn all_of_with_ref_base_merges_both_sides() {
    let registry = Registry::new(openapi_document());
    let generated = mockbird::generate(&registry, "#/components/schemas/Child");
    let object = generated.as_object().expect("an object");
    assert!(object.contains_key("token"));
    assert!(object.contains_key("family"));
    assert!(mockbird::is_valid(&registry, "#/components/schemas/Child", &generated));
}

#[test]
fn generation_is_deterministic_and_seed_sensitive() {
    let registry = Registry::new(openapi_document());
    let options = GeneratorOptions::new().seed(42);
    let first =
        Generator::with_options(&registry, options).generate("#/components/schemas/User");
    let second =
        Generator::with_options(&registry, options).generate("#/components/schemas/User");
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    let reseeded = Generator::with_options(&registry, GeneratorOptions::new().seed(7))
        .generate("#/components/schemas/User");
    assert_ne!(first, reseeded);
}

#[test_case("#/components/schemas/Base")]
#[test_case("#/components/schemas/Child")]
#[test_case("#/components/schemas/User")]
fn generated_instances_validate_against_their_schema(pointer: &str) {
    let registry = Registry::new(openapi_document());
    for seed in 0..24 {
        let generated =
            Generator::with_options(&registry, GeneratorOptions::new().seed(seed)).generate(pointer);
        let output = mockbird::validate(&registry, pointer, Some(&generated));
        assert!(
            output.valid,
            "seed {seed} at {pointer} produced {generated}, errors: {:?}",
            output.errors
        );
    }
}

#[test]
fn round_trip_law_over_assorted_schemas() {
    let schemas = [
        json!({"type": "integer", "minimum": -3, "maximum": 12}),
        json!({"type": "number", "exclusiveMinimum": 0, "maximum": 1}),
        json!({"type": "string", "minLength": 2, "maxLength": 4}),
        json!({"type": "string", "format": "email"}),
        json!({"enum": [1, "two", [3], {"four": 4}]}),
        json!({"const": {"fixed": true}}),
        json!({"type": "array", "minItems": 1, "maxItems": 5, "items": {"type": "boolean"}}),
        json!({
            "type": "object",
            "properties": {"a": {"type": "integer"}, "b": {"type": "string"}},
            "required": ["a"],
        }),
        json!({"anyOf": [{"type": "integer", "minimum": 0}, {"type": "string"}]}),
        json!({"oneOf": [{"type": "integer", "minimum": 100, "maximum": 200}]}),
    ];
    for schema in schemas {
        let registry = Registry::new(schema.clone());
        for seed in 0..16 {
            let generated =
                Generator::with_options(&registry, GeneratorOptions::new().seed(seed))
                    .generate("#");
            let output = mockbird::validate(&registry, "#", Some(&generated));
            assert!(
                output.valid,
                "schema {schema} seed {seed} produced invalid {generated}: {:?}",
                output.errors
            );
        }
    }
}

#[test]
fn external_refs_are_structured_errors_not_fetches() {
    let registry = Registry::new(json!({
        "properties": {"remote": {"$ref": "https://example.com/schemas/user.json#/User"}}
    }));
    let output = mockbird::validate(
        &registry,
        "#",
        Some(&json!({"remote": {"anything": 1}})),
    );
    assert!(!output.valid);
    let error = &output.errors[0];
    assert_eq!(error.keyword(), "$ref");
    assert_eq!(error.schema_path.to_string(), "/properties/remote/$ref");
    assert!(error.suggestion.as_deref().unwrap().contains("inline"));

    let generated = mockbird::generate(&registry, "#/properties/remote");
    assert_eq!(
        generated["$comment"],
        json!("Unresolved reference: https://example.com/schemas/user.json#/User")
    );
}

#[test]
fn cyclic_generation_terminates() {
    let registry = Registry::new(openapi_document());
    for seed in 0..24 {
        let generated = Generator::with_options(&registry, GeneratorOptions::new().seed(seed))
            .generate("#/components/schemas/Tree");
        // Recursion bottoms out at the ref guard; nested occurrences show up
        // as `$comment` markers rather than unbounded expansion.
        let object = generated.as_object().expect("an object");
        assert!(object.contains_key("value"));
    }
}

#[test]
fn component_schemas_cover_the_openapi_document() {
    let registry = Registry::new(openapi_document());
    let names: Vec<String> = registry
        .component_schemas()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, ["Base", "Child", "Tree", "User"]);
}

#[test]
fn validation_is_key_order_invariant() {
    let registry = Registry::new(openapi_document());
    let forward = json!({"id": 10, "name": "forward"});
    let backward = json!({"name": "forward", "id": 10});
    assert!(mockbird::is_valid(&registry, "#/components/schemas/User", &forward));
    assert!(mockbird::is_valid(&registry, "#/components/schemas/User", &backward));
}

#[test]
fn unresolved_entry_pointer_is_one_ref_error() {
    let registry = Registry::new(json!({"type": "object"}));
    let output = mockbird::validate(&registry, "#/components/schemas/Ghost", Some(&json!({})));
    assert_eq!(output.errors.len(), 1);
    assert_eq!(output.errors[0].keyword(), "$ref");
}
