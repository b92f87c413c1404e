use clap::Args;
use serde_json::Value;

use loan_data_core::comparison::compare_loan_terms;
use loan_data_core::StandardizedLoanData;

use crate::input;

/// Arguments for side-by-side loan comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Standardized loan records. One file holding a JSON array, or one file per loan.
    #[arg(long, num_args = 1..)]
    pub input: Vec<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loans = match args.input.as_slice() {
        [] => {
            let data = input::stdin::read_stdin()?
                .ok_or("loans required: pass --input <file.json>... or pipe a JSON array on stdin")?;
            parse_loans(data)?
        }
        [single] => parse_loans(input::file::read_json_value(single)?)?,
        many => many
            .iter()
            .map(|path| -> Result<StandardizedLoanData, Box<dyn std::error::Error>> {
                let value = input::file::read_json_value(path)?;
                let loan = serde_json::from_value(value)
                    .map_err(|e| format!("Invalid loan record in '{path}': {e}"))?;
                Ok(loan)
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    let result = compare_loan_terms(&loans)?;
    Ok(serde_json::to_value(result)?)
}

/// Accepts either a bare array of records or `{"loans": [...]}`.
fn parse_loans(value: Value) -> Result<Vec<StandardizedLoanData>, Box<dyn std::error::Error>> {
    let array = match value {
        Value::Object(mut map) if map.contains_key("loans") => map.remove("loans").unwrap_or_default(),
        other => other,
    };
    if !array.is_array() {
        return Err("expected a JSON array of standardized loan records".into());
    }
    Ok(serde_json::from_value(array)?)
}
