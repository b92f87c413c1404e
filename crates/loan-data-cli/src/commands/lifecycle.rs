use chrono::{NaiveDate, Utc};
use clap::Args;
use serde_json::{json, Value};

use loan_data_core::schema::{Amendment, AmendmentType, LifecycleState};
use loan_data_core::StandardizedLoanData;

use crate::input;

/// Arguments for a lifecycle transition
#[derive(Args)]
pub struct TransitionArgs {
    /// Path to a standardized loan record (JSON)
    #[arg(long)]
    pub input: Option<String>,

    /// Target state (negotiation, documentation, executed, active, matured, cancelled, defaulted)
    #[arg(long, value_parser = parse_state)]
    pub to: LifecycleState,

    /// Milestone date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Free-text note recorded on the milestone
    #[arg(long)]
    pub description: Option<String>,
}

/// Arguments for recording an amendment
#[derive(Args)]
pub struct AmendArgs {
    /// Path to a standardized loan record (JSON)
    #[arg(long)]
    pub input: Option<String>,

    /// Amendment identifier, unique within the loan
    #[arg(long)]
    pub id: String,

    /// pricing, covenant, maturity, amount or other
    #[arg(long = "type", value_parser = parse_amendment_type)]
    pub amendment_type: AmendmentType,

    /// What the amendment changes
    #[arg(long)]
    pub description: String,

    /// Amendment date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Mark the amendment as executed
    #[arg(long)]
    pub executed: bool,
}

fn parse_state(raw: &str) -> Result<LifecycleState, String> {
    serde_json::from_value(Value::String(raw.trim().to_ascii_lowercase()))
        .map_err(|_| format!("unknown lifecycle state '{raw}'"))
}

fn parse_amendment_type(raw: &str) -> Result<AmendmentType, String> {
    serde_json::from_value(Value::String(raw.trim().to_ascii_lowercase()))
        .map_err(|_| format!("unknown amendment type '{raw}'"))
}

pub fn run_transition(args: TransitionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut record: StandardizedLoanData = input::load(args.input.as_deref(), "standardized loan record")?;
    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());

    let milestone = record.transition(args.to, date, args.description)?.clone();

    Ok(json!({
        "id": record.id,
        "state": record.state(),
        "milestone": milestone,
        "record": record,
    }))
}

pub fn run_amend(args: AmendArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut record: StandardizedLoanData = input::load(args.input.as_deref(), "standardized loan record")?;

    record.amend(Amendment {
        id: args.id,
        date: args.date.unwrap_or_else(|| Utc::now().date_naive()),
        amendment_type: args.amendment_type,
        description: args.description,
        executed: args.executed,
    })?;

    Ok(json!({
        "id": record.id,
        "state": record.state(),
        "amendments": record.lifecycle.amendments.len(),
        "record": record,
    }))
}
