//! CSV rendering: one header row, one value row, RFC 4180 quoting.

use serde_json::Value;

use crate::flatten::flatten_value;

fn quote(field: &str) -> String {
    if field.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn value_to_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a document as a single-record CSV (header line + value line).
pub fn single_row(document: &Value) -> String {
    let flat = flatten_value(document);

    let headers: Vec<String> = flat.keys().map(|k| quote(k)).collect();
    let values: Vec<String> = flat.values().map(|v| quote(&value_to_field(v))).collect();

    format!("{}\n{}\n", headers.join(","), values.join(","))
}
