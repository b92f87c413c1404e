use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, comparison_rows, issue_rows};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        // exported documents
        Value::String(document) => println!("{}", document),
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else if map.contains_key("errors") || map.contains_key("warnings") {
                print_issue_report(map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => {
            for item in arr {
                println!("{}", cell(item));
            }
        }
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => match comparison_rows(res_map) {
            Some((header, rows)) => {
                let mut builder = Builder::default();
                builder.push_record(header);
                for row in rows {
                    builder.push_record(row);
                }
                println!("{}", Table::from(builder));
                print_list("Recommendations", res_map.get("recommendations"));
            }
            None => print_flat_object(res_map),
        },
        _ => print_flat_object(envelope),
    }

    print_list("Warnings", envelope.get("warnings"));

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Standardization outcomes and validation reports: scalar summary, then issues.
fn print_issue_report(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        match (key.as_str(), val) {
            ("errors" | "warnings", _) => {}
            ("record", Value::Object(record)) => {
                for name in ["id", "version", "dataStandard"] {
                    if let Some(v) = record.get(name) {
                        builder.push_record([name.to_string(), cell(v)]);
                    }
                }
                if let Some(Value::Object(quality)) = record.get("dataQuality") {
                    for name in ["completeness", "accuracy"] {
                        if let Some(v) = quality.get(name) {
                            builder.push_record([name.to_string(), cell(v)]);
                        }
                    }
                }
            }
            _ => builder.push_record([key.clone(), cell(val)]),
        }
    }
    println!("{}", Table::from(builder));

    let rows = issue_rows(map).unwrap_or_default();
    if rows.is_empty() {
        println!("\nNo issues.");
        return;
    }
    let mut issues = Builder::default();
    issues.push_record(["Severity", "Rule", "Field", "Message"]);
    for row in rows {
        issues.push_record(row);
    }
    println!("\n{}", Table::from(issues));
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), cell(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_list(title: &str, items: Option<&Value>) {
    if let Some(Value::Array(items)) = items {
        if !items.is_empty() {
            println!("\n{}:", title);
            for item in items {
                println!("  - {}", cell(item));
            }
        }
    }
}
