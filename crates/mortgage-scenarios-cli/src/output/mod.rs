pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The first non-empty array of objects in a result (scenarios, loans,
/// schedule rows), used as the row set for tabular formats.
pub(crate) fn primary_rows(result: &Map<String, Value>) -> Option<(&str, &[Value])> {
    result.iter().find_map(|(key, val)| match val {
        Value::Array(arr) if matches!(arr.first(), Some(Value::Object(_))) => {
            Some((key.as_str(), arr.as_slice()))
        }
        _ => None,
    })
}

/// Flatten nested objects and arrays into dotted column names
/// (`scenario.points`, `milestones.0.year`).
pub(crate) fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, Value)>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                flatten(&join(key), val, out);
            }
        }
        Value::Array(arr) if arr.iter().any(|v| v.is_object()) => {
            for (i, val) in arr.iter().enumerate() {
                flatten(&join(&i.to_string()), val, out);
            }
        }
        _ => out.push((prefix.to_string(), value.clone())),
    }
}

/// Column headers and row cells for a set of objects. Headers come from the
/// first row; later rows fill missing columns with null.
pub(crate) fn tabulate(rows: &[Value]) -> (Vec<String>, Vec<Vec<Value>>) {
    let flat: Vec<Vec<(String, Value)>> = rows
        .iter()
        .map(|row| {
            let mut cells = Vec::new();
            flatten("", row, &mut cells);
            cells
        })
        .collect();

    let headers: Vec<String> = flat
        .first()
        .map(|cells| cells.iter().map(|(k, _)| k.clone()).collect())
        .unwrap_or_default();

    let body = flat
        .into_iter()
        .map(|cells| {
            headers
                .iter()
                .map(|h| {
                    cells
                        .iter()
                        .find(|(k, _)| k == h)
                        .map(|(_, v)| v.clone())
                        .unwrap_or(Value::Null)
                })
                .collect()
        })
        .collect();

    (headers, body)
}
