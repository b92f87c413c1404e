use serde_json::Value;

/// Pretty-print JSON to stdout. Exported documents arrive as a bare
/// string and are printed verbatim.
pub fn print_json(value: &Value) {
    if let Value::String(document) = value {
        println!("{}", document);
        return;
    }
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}
