//! Mock-value generation: produce a plausible instance for any schema.
//!
//! Priority order per node: depth guard, boolean schemas, `$ref`,
//! `example` → `examples[0]` → `default` → `const` → `enum`, composition
//! (`anyOf`/`oneOf`/`allOf`), then type-directed synthesis. Cycles and
//! unresolved references degrade to `$comment` marker objects instead of
//! failing — a mock server would rather ship a placeholder than a 500.
mod formats;
pub(crate) mod rng;

use referencing::Registry;
use serde_json::{json, Map, Value};

use self::rng::Lcg;

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Configuration for a generation call.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorOptions {
    max_depth: usize,
    seed: u32,
}

impl GeneratorOptions {
    #[must_use]
    pub fn new() -> GeneratorOptions {
        GeneratorOptions {
            max_depth: 10,
            seed: 0,
        }
    }

    /// Bound on structural recursion depth; deeper nodes generate `null`.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> GeneratorOptions {
        self.max_depth = depth;
        self
    }

    /// Seed for the per-call RNG. Identical seeds give byte-identical
    /// output.
    #[must_use]
    pub fn seed(mut self, seed: u32) -> GeneratorOptions {
        self.seed = seed;
        self
    }
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions::new()
    }
}

/// Generates mock instances for schemas in a registry.
pub struct Generator<'r> {
    registry: &'r Registry,
    options: GeneratorOptions,
}

impl<'r> Generator<'r> {
    #[must_use]
    pub fn new(registry: &'r Registry) -> Generator<'r> {
        Generator {
            registry,
            options: GeneratorOptions::new(),
        }
    }

    #[must_use]
    pub fn with_options(registry: &'r Registry, options: GeneratorOptions) -> Generator<'r> {
        Generator { registry, options }
    }

    /// Generate a value for the schema at `pointer`.
    ///
    /// Never fails: an unresolvable pointer yields a `$comment` marker.
    /// The RNG is re-seeded on every call, so repeated calls are identical.
    #[must_use]
    pub fn generate(&self, pointer: &str) -> Value {
        let mut state = GenState {
            registry: self.registry,
            rng: Lcg::new(self.options.seed),
            visited_refs: Vec::new(),
            max_depth: self.options.max_depth,
        };
        match self.registry.get(pointer) {
            Some(schema) => state.schema(schema.raw(), 0),
            None => unresolved_marker(pointer),
        }
    }
}

fn unresolved_marker(reference: &str) -> Value {
    json!({"$comment": format!("Unresolved reference: {reference}")})
}

fn cycle_marker(reference: &str) -> Value {
    json!({"$comment": format!("Circular reference to {reference}")})
}

struct GenState<'r> {
    registry: &'r Registry,
    rng: Lcg,
    visited_refs: Vec<String>,
    max_depth: usize,
}

impl GenState<'_> {
    fn schema(&mut self, schema: &Value, depth: usize) -> Value {
        if depth > self.max_depth {
            return Value::Null;
        }
        let object = match schema {
            Value::Bool(true) => return json!({}),
            Value::Bool(false) => return Value::Null,
            Value::Object(object) => object,
            _ => return Value::Null,
        };

        if let Some(Value::String(reference)) = object.get("$ref") {
            if self.visited_refs.iter().any(|seen| seen == reference) {
                return cycle_marker(reference);
            }
            let Some(target) = self.registry.resolve_ref(reference) else {
                return unresolved_marker(reference);
            };
            self.visited_refs.push(reference.clone());
            let value = self.schema(target.raw(), depth);
            self.visited_refs.pop();
            return value;
        }

        if let Some(example) = object.get("example") {
            return example.clone();
        }
        if let Some(Value::Array(examples)) = object.get("examples") {
            if let Some(first) = examples.first() {
                return first.clone();
            }
        }
        if let Some(default) = object.get("default") {
            return default.clone();
        }
        if let Some(constant) = object.get("const") {
            return constant.clone();
        }
        if let Some(Value::Array(options)) = object.get("enum") {
            if !options.is_empty() {
                return self.rng.pick(options).clone();
            }
        }

        if let Some(Value::Array(branches)) = object.get("anyOf") {
            if !branches.is_empty() {
                // Prefer a branch that produces data over a bare null.
                let branch = branches
                    .iter()
                    .find(|branch| inferred_type(branch) != Some("null"))
                    .unwrap_or(&branches[0]);
                return self.schema(branch, depth + 1);
            }
        }
        if let Some(Value::Array(branches)) = object.get("oneOf") {
            if let Some(first) = branches.first() {
                return self.schema(first, depth + 1);
            }
        }
        if let Some(Value::Array(branches)) = object.get("allOf") {
            return self.merge_all_of(branches, depth);
        }

        let type_name = match object.get("type") {
            Some(Value::String(name)) => Some(name.as_str()),
            Some(Value::Array(names)) => names.first().and_then(Value::as_str),
            _ => None,
        };
        match type_name {
            Some("null") => Value::Null,
            Some("boolean") => Value::Bool(self.rng.chance(0.5)),
            Some("integer") => self.integer(object),
            Some("number") => self.number(object),
            Some("string") => self.string(object),
            Some("array") => self.array(object, depth),
            Some("object") => self.object(object, depth),
            _ => {
                // No declared type: infer from structure.
                if object.contains_key("properties") || object.contains_key("required") {
                    self.object(object, depth)
                } else if object.contains_key("items") || object.contains_key("prefixItems") {
                    self.array(object, depth)
                } else {
                    json!({})
                }
            }
        }
    }

    /// `allOf` composes an object: every branch's declared properties are
    /// generated and merged, resolving `$ref` branches through the registry.
    fn merge_all_of(&mut self, branches: &[Value], depth: usize) -> Value {
        let mut merged = Map::new();
        for branch in branches {
            self.merge_branch(branch, depth, &mut merged);
        }
        Value::Object(merged)
    }

    fn merge_branch(&mut self, branch: &Value, depth: usize, merged: &mut Map<String, Value>) {
        if let Some(Value::String(reference)) = branch.get("$ref") {
            if self.visited_refs.iter().any(|seen| seen == reference) {
                return;
            }
            let Some(resolved) = self.registry.resolve_ref(reference) else {
                return;
            };
            self.visited_refs.push(reference.clone());
            self.merge_branch(resolved.raw(), depth, merged);
            self.visited_refs.pop();
            return;
        }
        let Some(branch) = branch.as_object() else {
            return;
        };
        if let Some(Value::Array(nested)) = branch.get("allOf") {
            for inner in nested {
                self.merge_branch(inner, depth, merged);
            }
        }
        if let Some(Value::Object(properties)) = branch.get("properties") {
            for (name, subschema) in properties {
                let value = self.schema(subschema, depth + 1);
                merged.insert(name.clone(), value);
            }
        }
    }

    fn integer(&mut self, schema: &Map<String, Value>) -> Value {
        let minimum = schema.get("minimum").and_then(Value::as_f64);
        let exclusive_minimum = schema.get("exclusiveMinimum").and_then(Value::as_f64);
        let maximum = schema.get("maximum").and_then(Value::as_f64);
        let exclusive_maximum = schema.get("exclusiveMaximum").and_then(Value::as_f64);

        #[allow(clippy::cast_possible_truncation)]
        let lo = [
            minimum.map(|limit| limit.ceil() as i64),
            exclusive_minimum.map(|limit| limit.floor() as i64 + 1),
        ]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(0);
        #[allow(clippy::cast_possible_truncation)]
        let hi = [
            maximum.map(|limit| limit.floor() as i64),
            exclusive_maximum.map(|limit| limit.ceil() as i64 - 1),
        ]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(lo + 99);
        let mut value = self.rng.int_in(lo, hi.max(lo));

        if let Some(multiple_of) = schema.get("multipleOf").and_then(Value::as_f64) {
            if multiple_of > 0.0 {
                #[allow(clippy::cast_possible_truncation)]
                let step = multiple_of.round().max(1.0) as i64;
                value = (value / step) * step;
                if value < lo {
                    value += step;
                }
            }
        }
        Value::from(value)
    }

    fn number(&mut self, schema: &Map<String, Value>) -> Value {
        let minimum = schema.get("minimum").and_then(Value::as_f64);
        let exclusive_minimum = schema.get("exclusiveMinimum").and_then(Value::as_f64);
        let maximum = schema.get("maximum").and_then(Value::as_f64);
        let exclusive_maximum = schema.get("exclusiveMaximum").and_then(Value::as_f64);

        // Nudge off the open end of the interval.
        let nudged = exclusive_minimum.map(|limit| limit + limit.abs().max(1.0) * 1e-9);
        let lo = match (minimum, nudged) {
            (Some(minimum), Some(nudged)) => minimum.max(nudged),
            (Some(minimum), None) => minimum,
            (None, Some(nudged)) => nudged,
            (None, None) => 0.0,
        };
        let hi = match (maximum, exclusive_maximum) {
            (Some(maximum), Some(exclusive)) => maximum.min(exclusive),
            (Some(maximum), None) => maximum,
            (None, Some(exclusive)) => exclusive,
            (None, None) => lo + 100.0,
        };
        let mut value = if hi > lo {
            lo + self.rng.next_f64() * (hi - lo)
        } else {
            lo
        };

        if let Some(multiple_of) = schema.get("multipleOf").and_then(Value::as_f64) {
            if multiple_of > 0.0 {
                value = (value / multiple_of).floor() * multiple_of;
                if value < lo {
                    value += multiple_of;
                }
            }
        }
        Value::from(value)
    }

    fn string(&mut self, schema: &Map<String, Value>) -> Value {
        if let Some(Value::String(format)) = schema.get("format") {
            if let Some(value) = formats::generate(format, &mut self.rng) {
                return Value::String(value);
            }
        }
        #[allow(clippy::cast_possible_truncation)]
        let lo = schema
            .get("minLength")
            .and_then(Value::as_u64)
            .unwrap_or(1) as usize;
        #[allow(clippy::cast_possible_truncation)]
        let hi = schema
            .get("maxLength")
            .and_then(Value::as_u64)
            .unwrap_or_else(|| (lo as u64).max(10)) as usize;
        let length = self.rng.len_in(lo, hi.max(lo));
        let mut value = String::with_capacity(length);
        for _ in 0..length {
            value.push(*self.rng.pick(ALPHANUMERIC) as char);
        }
        Value::String(value)
    }

    fn array(&mut self, schema: &Map<String, Value>, depth: usize) -> Value {
        let prefixes = match schema.get("prefixItems") {
            Some(Value::Array(prefixes)) => prefixes.as_slice(),
            _ => &[],
        };
        let items_schema = schema.get("items");

        #[allow(clippy::cast_possible_truncation)]
        let lo = schema
            .get("minItems")
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize;
        #[allow(clippy::cast_possible_truncation)]
        let hi = schema
            .get("maxItems")
            .and_then(Value::as_u64)
            .unwrap_or_else(|| (lo as u64).max(3)) as usize;
        let mut length = self.rng.len_in(lo, hi.max(lo));
        if items_schema.is_none() {
            // Nothing to fill the tail from.
            length = length.min(prefixes.len());
        }

        let mut items = Vec::with_capacity(length);
        for index in 0..length {
            let value = match prefixes.get(index) {
                Some(prefix) => self.schema(prefix, depth + 1),
                None => match items_schema {
                    Some(item) => self.schema(item, depth + 1),
                    None => Value::Null,
                },
            };
            items.push(value);
        }
        Value::Array(items)
    }

    fn object(&mut self, schema: &Map<String, Value>, depth: usize) -> Value {
        let empty = Map::new();
        let properties = match schema.get("properties") {
            Some(Value::Object(properties)) => properties,
            _ => &empty,
        };
        let required: Vec<&str> = match schema.get("required") {
            Some(Value::Array(required)) => {
                required.iter().filter_map(Value::as_str).collect()
            }
            _ => Vec::new(),
        };

        let mut object = Map::new();
        for name in &required {
            let value = match properties.get(*name) {
                Some(subschema) => self.schema(subschema, depth + 1),
                // Required but undeclared; emit something recognizable.
                None => Value::String(String::from("placeholder")),
            };
            object.insert((*name).to_string(), value);
        }
        for (name, subschema) in properties {
            if required.contains(&name.as_str()) {
                continue;
            }
            if self.rng.chance(0.5) {
                let value = self.schema(subschema, depth + 1);
                object.insert(name.clone(), value);
            }
        }
        Value::Object(object)
    }
}

/// Best-effort type of a subschema, for the `anyOf` null-avoidance rule.
fn inferred_type(schema: &Value) -> Option<&str> {
    let object = schema.as_object()?;
    match object.get("type") {
        Some(Value::String(name)) => Some(name.as_str()),
        Some(Value::Array(names)) => names.first().and_then(Value::as_str),
        _ => {
            if object.contains_key("properties") {
                Some("object")
            } else if object.contains_key("items") {
                Some("array")
            } else {
                None
            }
        }
    }
}
