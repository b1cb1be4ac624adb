//! Schema type tests

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_nullable_type_serialization() {
    let prop = SchemaProperty::date_time().with_description("Last update");

    assert_eq!(
        serde_json::to_value(&prop).unwrap(),
        json!({
            "type": ["string", "null"],
            "format": "date-time",
            "description": "Last update"
        })
    );
    assert!(prop.is_nullable());
    assert_eq!(
        prop.json_type,
        JsonTypeOrArray::Multiple(vec![JsonType::String, JsonType::Null])
    );
}

#[test]
fn test_nullable_null_stays_single() {
    assert_eq!(
        JsonTypeOrArray::nullable(JsonType::Null),
        JsonTypeOrArray::Single(JsonType::Null)
    );
}

#[test]
fn test_open_object() {
    let prop = SchemaProperty::open_object();
    assert_eq!(prop.additional_properties, Some(true));
    assert!(prop.is_nullable());
    assert_eq!(
        prop.json_type,
        JsonTypeOrArray::Multiple(vec![JsonType::Object, JsonType::Null])
    );
}

#[test]
fn test_schema_builder() {
    let schema = JsonSchema::new()
        .required_property("id", SchemaProperty::new(JsonType::String))
        .property("status", SchemaProperty::string())
        .required_property("id", SchemaProperty::new(JsonType::String));

    assert_eq!(schema.required, vec!["id".to_string()]);
    assert!(schema.is_required("id"));
    assert!(!schema.is_required("status"));
    assert!(schema.get_property("status").unwrap().is_nullable());

    let value = schema.to_json();
    assert_eq!(value["type"], "object");
    assert_eq!(value["additionalProperties"], true);
    assert_eq!(value["properties"]["id"]["type"], "string");
}

#[test]
fn test_schema_deserialize_defaults_permissive() {
    let schema: JsonSchema = serde_json::from_value(json!({"type": "object"})).unwrap();
    assert!(schema.additional_properties);
    assert!(schema.properties.is_empty());
}

#[test]
fn test_json_type_display() {
    assert_eq!(JsonType::Integer.to_string(), "integer");
    assert_eq!(JsonType::Object.to_string(), "object");
}
