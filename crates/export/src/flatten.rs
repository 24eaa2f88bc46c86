//! Nested-document flattening for tabular exports.

use serde_json::{Map, Value};

/// Flatten a JSON value to dot-separated keys; array elements are indexed.
///
/// Scalars keep their JSON type; `null` stays `null`. Empty objects and
/// arrays disappear (they have nothing to contribute to a row).
pub fn flatten_value(value: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    walk(value, String::new(), &mut out);
    out
}

fn walk(value: &Value, prefix: String, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let next = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                walk(child, next, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                walk(child, format!("{prefix}.{index}"), out);
            }
        }
        scalar => {
            out.insert(prefix, scalar.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_objects_flatten_with_dots() {
        let flat = flatten_value(&json!({
            "sender": { "name": "Acme", "address": { "city": "Berlin" } },
            "total": 12.5
        }));

        assert_eq!(flat["sender.name"], json!("Acme"));
        assert_eq!(flat["sender.address.city"], json!("Berlin"));
        assert_eq!(flat["total"], json!(12.5));
    }

    #[test]
    fn arrays_flatten_with_indices() {
        let flat = flatten_value(&json!({
            "items": [ { "name": "A" }, { "name": "B" } ]
        }));

        assert_eq!(flat["items.0.name"], json!("A"));
        assert_eq!(flat["items.1.name"], json!("B"));
    }

    #[test]
    fn scalars_keep_their_types() {
        let flat = flatten_value(&json!({"paid": true, "note": null, "count": 3}));
        assert_eq!(flat["paid"], json!(true));
        assert_eq!(flat["note"], json!(null));
        assert_eq!(flat["count"], json!(3));
    }
}
