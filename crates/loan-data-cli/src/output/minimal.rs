use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "confidence",
        "valid",
        "compatibilityScore",
        "state",
        "recommendations",
        "id",
    ];

    if let Value::Object(map) = result_obj {
        // standardize wraps the record
        if let Some(Value::Object(record)) = map.get("record") {
            if let Some(accuracy) = record.get("dataQuality").and_then(|q| q.get("accuracy")) {
                println!("{}", format_minimal(accuracy));
                return;
            }
        }

        if let Some(confidence) = map.get("extraction").and_then(|e| e.get("confidence")) {
            println!("{}", format_minimal(confidence));
            return;
        }

        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(format_minimal)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
