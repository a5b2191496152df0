use serde_json::Value;

/// Print just the key answer from the output.
///
/// Schedules print the monthly payment. Searches print the best scenario's
/// headline figures, or a count when there is nothing to show.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        if let Some(pmt) = map.get("monthly_payment").filter(|v| !v.is_null()) {
            println!("{}", format_minimal(pmt));
            return;
        }

        for key in ["scenarios", "loans"] {
            if let Some(Value::Array(rows)) = map.get(key) {
                match rows.first() {
                    Some(first) => {
                        let s = first.get("scenario").unwrap_or(first);
                        println!(
                            "{} {}: points={} down={} monthly={} cash={}",
                            rows.len(),
                            key,
                            field(s, "points"),
                            field(s, "down_pct"),
                            field(s, "total_monthly"),
                            field(s, "total_cash_used"),
                        );
                    }
                    None => println!("0 {}", key),
                }
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn field(obj: &Value, key: &str) -> String {
    obj.get(key).map(format_minimal).unwrap_or_default()
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
