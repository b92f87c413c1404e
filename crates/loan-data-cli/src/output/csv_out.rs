use serde_json::{Map, Value};
use std::io;

use super::{cell, comparison_rows, issue_rows};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    // export --format csv already produced a CSV document
    if let Value::String(document) = value {
        print!("{}", document);
        return;
    }

    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                match comparison_rows(result) {
                    Some((header, rows)) => {
                        let _ = wtr.write_record(&header);
                        for row in rows {
                            let _ = wtr.write_record(&row);
                        }
                    }
                    None => write_fields(&mut wtr, result),
                }
            } else if let Some(rows) = issue_rows(map) {
                let _ = wtr.write_record(["severity", "rule", "field", "message"]);
                for row in rows {
                    let _ = wtr.write_record(&row);
                }
            } else {
                write_fields(&mut wtr, map);
            }
        }
        Value::Array(arr) => {
            for item in arr {
                let _ = wtr.write_record([cell(item)]);
            }
        }
        _ => {
            let _ = wtr.write_record([cell(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields(wtr: &mut csv::Writer<io::StdoutLock<'_>>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &cell(val)]);
    }
}
