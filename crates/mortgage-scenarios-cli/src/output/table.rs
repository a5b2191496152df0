use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{primary_rows, tabulate};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    match primary_rows(result) {
        Some((key, rows)) => {
            println!("{} ({})", key, rows.len());
            print_array_table(rows);

            // Remaining scalar and summary fields
            let summary: Map<String, Value> = result
                .iter()
                .filter(|(k, v)| k.as_str() != key && !is_row_set(v))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            if !summary.is_empty() {
                println!();
                print_flat_object(&summary);
            }
        }
        None => print_flat_object(result),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn is_row_set(value: &Value) -> bool {
    matches!(value, Value::Array(arr) if arr.is_empty() || arr.iter().all(Value::is_object))
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if arr.iter().all(Value::is_object) {
        let (headers, body) = tabulate(arr);
        let mut builder = Builder::default();
        builder.push_record(&headers);
        for row in body {
            builder.push_record(row.iter().map(format_value));
        }
        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
