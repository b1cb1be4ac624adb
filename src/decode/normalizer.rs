//! JSON:API response normalizer
//!
//! Persona responses wrap each resource as
//! `{"type", "id", "attributes": {...}, "relationships": {...}}` with
//! hyphenated attribute names. Downstream consumers want one flat object per
//! resource with underscored names.

use crate::error::{Error, Result};
use crate::types::Record;
use serde_json::Value;
use tracing::warn;

/// Flattens JSON:API resources into records
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    /// Dot path to the resource array
    data_path: String,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self {
            data_path: "data".to_string(),
        }
    }
}

impl ResponseNormalizer {
    /// Create a normalizer reading resources from `data`
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten every resource of a page, preserving API order
    pub fn normalize(&self, body: &Value) -> Result<Vec<Record>> {
        let Some(data) = body.get(&self.data_path) else {
            return Ok(Vec::new());
        };

        let resources = match data {
            Value::Array(items) => items,
            Value::Null => return Ok(Vec::new()),
            other => {
                return Err(Error::decode(format!(
                    "expected '{}' to be an array, got {}",
                    self.data_path,
                    json_kind(other)
                )))
            }
        };

        resources
            .iter()
            .enumerate()
            .map(|(index, resource)| {
                flatten_resource(resource).ok_or_else(|| {
                    Error::decode(format!(
                        "resource {index} in '{}' is {}, expected an object",
                        self.data_path,
                        json_kind(resource)
                    ))
                })
            })
            .collect()
    }
}

/// Flatten a single JSON:API resource. Returns `None` for non-objects.
///
/// Envelope fields (`id`, `type`, `relationships`) are written first and an
/// attribute never overwrites a field already present.
pub fn flatten_resource(resource: &Value) -> Option<Record> {
    let resource = resource.as_object()?;
    let mut record = Record::new();

    record.insert(
        "id".to_string(),
        resource.get("id").cloned().unwrap_or(Value::Null),
    );
    record.insert(
        "type".to_string(),
        resource.get("type").cloned().unwrap_or(Value::Null),
    );
    if let Some(relationships) = resource.get("relationships") {
        record.insert("relationships".to_string(), relationships.clone());
    }

    if let Some(Value::Object(attributes)) = resource.get("attributes") {
        for (key, value) in attributes {
            let name = normalize_field_name(key);
            if record.contains_key(&name) {
                warn!(
                    id = ?record.get("id"),
                    attribute = %key,
                    "Attribute collides with an existing field after normalization, skipping"
                );
                continue;
            }
            record.insert(name, value.clone());
        }
    }

    Some(record)
}

/// `created-at` → `created_at`
pub fn normalize_field_name(name: &str) -> String {
    name.replace('-', "_")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
