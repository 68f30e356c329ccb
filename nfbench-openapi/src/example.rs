//! Example values for schemas, shown next to empty placeholders in the settings template.

use serde_json::{Map, Value, json};

use crate::definitions::Definitions;
use crate::document::Schema;

/// Nesting depth after which objects and arrays are no longer expanded.
pub const MAX_EXAMPLE_DEPTH: usize = 4;

/// Returns an example value for a well-known string format.
pub fn example_for_format(format: &str) -> Option<Value> {
    let example = match format {
        "uuid" => "550e8400-e29b-41d4-a716-446655440000",
        "date-time" => "2025-01-01T00:00:00Z",
        "date" => "2025-01-01",
        "email" => "example@example.com",
        "uri" => "http://example.com",
        "ipv4" => "192.168.1.1",
        "ipv6" => "2001:db8::1",
        _ => return None,
    };
    Some(Value::from(example))
}

/// Returns an example value for a schema type, without looking at nested schemas.
pub fn example_for_type(ty: &str) -> Value {
    match ty {
        "string" => json!("example-string"),
        "integer" => json!(0),
        "number" => json!(0.0),
        "boolean" => json!(false),
        "array" => json!(["example-item"]),
        "object" => json!({}),
        _ => json!("example-value"),
    }
}

/// Generates an example value for a schema.
///
/// Declared examples and enums are preferred. References, `allOf` compositions, arrays and objects
/// are expanded recursively up to [`MAX_EXAMPLE_DEPTH`].
pub fn example_value(schema: &Schema, definitions: &Definitions) -> Value {
    generate(schema, definitions, 0)
}

fn generate(schema: &Schema, definitions: &Definitions, depth: usize) -> Value {
    if let Some(example) = &schema.example {
        return example.clone();
    }
    if let Some(first) = schema.enumeration.first() {
        return first.clone();
    }

    if let Some(reference) = schema.reference.as_deref() {
        return match definitions.schema(reference) {
            Some(_) if depth >= MAX_EXAMPLE_DEPTH => json!({}),
            Some(target) => generate(target, definitions, depth + 1),
            None => json!("example-value"),
        };
    }

    if let Some(example) = schema.format.as_deref().and_then(example_for_format) {
        return example;
    }

    if let Some(first) = schema.one_of.first().or(schema.any_of.first()) {
        return generate(first, definitions, depth);
    }

    let is_object = schema.type_name() == Some("object")
        || !schema.properties.is_empty()
        || !schema.all_of.is_empty();
    if is_object {
        return object_example(schema, definitions, depth);
    }

    match schema.type_name() {
        Some("array") => match &schema.items {
            Some(_) if depth >= MAX_EXAMPLE_DEPTH => json!([]),
            Some(items) => json!([generate(items, definitions, depth + 1)]),
            None => example_for_type("array"),
        },
        Some(ty) => example_for_type(ty),
        None => json!("example-value"),
    }
}

fn object_example(schema: &Schema, definitions: &Definitions, depth: usize) -> Value {
    if depth >= MAX_EXAMPLE_DEPTH {
        return json!({});
    }

    let shape = definitions.object_shape(schema);
    let object: Map<String, Value> = shape
        .properties
        .iter()
        .map(|(name, property)| (name.clone(), generate(property, definitions, depth + 1)))
        .collect();
    Value::Object(object)
}
