use chrono::Utc;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use loan_data_core::config::ValidationConfig;
use loan_data_core::schema::Pricing;
use loan_data_core::standardizer::{PartialAmount, PartialBorrower};
use loan_data_core::{standardize_with, validate_loan_data, PartialLoanRecord, StandardizedLoanData};

use crate::input;

/// Arguments for standardizing a raw loan record
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct StandardizeArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan identifier
    #[arg(long)]
    pub id: Option<String>,

    /// Borrower legal name
    #[arg(long)]
    pub borrower: Option<String>,

    /// Principal amount
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// ISO 4217 currency code
    #[arg(long)]
    pub currency: Option<String>,

    /// Margin over the base rate in basis points
    #[arg(long)]
    pub margin: Option<Decimal>,

    /// Allowed gap in months between term months and years * 12
    #[arg(long)]
    pub term_tolerance: Option<u32>,

    /// Source system stamped on records that arrive without one
    #[arg(long)]
    pub source_system: Option<String>,
}

/// Arguments for validating a canonical loan record
#[derive(Args)]
pub struct ValidateArgs {
    /// Path to a standardized loan record (JSON)
    #[arg(long)]
    pub input: Option<String>,

    /// Allowed gap in months between term months and years * 12
    #[arg(long)]
    pub term_tolerance: Option<u32>,
}

fn validation_config(term_tolerance: Option<u32>, source_system: Option<String>) -> ValidationConfig {
    let mut config = ValidationConfig::default();
    if let Some(months) = term_tolerance {
        config.term_tolerance_months = months;
    }
    if let Some(source) = source_system {
        config.default_source_system = source;
    }
    config
}

pub fn run_standardize(args: StandardizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw: PartialLoanRecord = if let Some(ref path) = args.input {
        input::load(Some(path.as_str()), "loan record")?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        PartialLoanRecord {
            id: args.id,
            borrower: PartialBorrower {
                name: args.borrower,
                ..Default::default()
            },
            amount: PartialAmount {
                value: args.amount,
                currency: args.currency,
            },
            pricing: Pricing {
                margin: args.margin,
                ..Default::default()
            },
            ..Default::default()
        }
    };

    let config = validation_config(args.term_tolerance, args.source_system);
    let outcome = standardize_with(&raw, &config, Utc::now());

    if !outcome.is_accepted() {
        return Err(format!(
            "Record rejected with {} error(s): {}",
            outcome.errors.len(),
            outcome.error_messages().join("; ")
        )
        .into());
    }

    info!(warnings = outcome.warnings.len(), "record standardized");
    Ok(serde_json::to_value(outcome)?)
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: StandardizedLoanData = input::load(args.input.as_deref(), "standardized loan record")?;
    let config = validation_config(args.term_tolerance, None);
    let report = validate_loan_data(&record, &config);
    Ok(serde_json::to_value(report)?)
}
