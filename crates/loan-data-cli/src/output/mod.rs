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

/// Header and rows for one-line-per-loan rendering of a comparison.
///
/// A comparison result holds index-aligned arrays keyed by field; every
/// array as long as `loanIds` becomes a column.
pub(crate) fn comparison_rows(result: &Map<String, Value>) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let ids = result.get("loanIds")?.as_array()?;
    let columns: Vec<(&String, &Vec<Value>)> = result
        .iter()
        .filter_map(|(key, val)| match val {
            Value::Array(arr) if key != "loanIds" && arr.len() == ids.len() => Some((key, arr)),
            _ => None,
        })
        .collect();

    let mut header = vec!["loanId".to_string()];
    header.extend(columns.iter().map(|(key, _)| key.to_string()));

    let rows = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let mut row = vec![cell(id)];
            row.extend(columns.iter().map(|(_, arr)| cell(&arr[i])));
            row
        })
        .collect();
    Some((header, rows))
}

/// Errors, then warnings, as `severity, rule, field, message` rows.
pub(crate) fn issue_rows(map: &Map<String, Value>) -> Option<Vec<[String; 4]>> {
    let errors = map.get("errors").and_then(Value::as_array);
    let warnings = map.get("warnings").and_then(Value::as_array);
    if errors.is_none() && warnings.is_none() {
        return None;
    }

    let rows = errors
        .into_iter()
        .chain(warnings)
        .flatten()
        .filter_map(Value::as_object)
        .map(|issue| {
            let field = |name: &str| issue.get(name).map(cell).unwrap_or_default();
            [field("severity"), field("rule"), field("field"), field("message")]
        })
        .collect();
    Some(rows)
}

pub(crate) fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(cell).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
