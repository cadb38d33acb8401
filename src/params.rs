//! Flattening of nested request parameters into HTTP key/value pairs.

use serde_json::Value;

/// Flatten a (possibly nested) JSON object into an ordered list of
/// key/value pairs suitable for query or form encoding.
///
/// Nested objects produce bracketed composite keys
/// (`parent[child]=value`, recursively); arrays produce one `parent[]`
/// pair per element. Emission order follows input insertion order.
pub fn flatten(params: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if let Value::Object(map) = params {
        for (key, value) in map {
            flatten_into(key, value, &mut pairs);
        }
    }
    pairs
}

fn flatten_into(key: &str, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (child, child_value) in map {
                flatten_into(&format!("{key}[{child}]"), child_value, pairs);
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten_into(&format!("{key}[]"), item, pairs);
            }
        }
        scalar => pairs.push((key.to_string(), scalar_to_string(scalar))),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
