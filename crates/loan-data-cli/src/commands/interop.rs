use clap::{Args, ValueEnum};
use serde_json::Value;
use tracing::warn;

use loan_data_core::config::ExportConfig;
use loan_data_core::interop::{export_to_format, generate_interoperability_report};
use loan_data_core::schema::ExportFormat;
use loan_data_core::StandardizedLoanData;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormatArg {
    Json,
    Xml,
    Csv,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Json => ExportFormat::Json,
            ExportFormatArg::Xml => ExportFormat::Xml,
            ExportFormatArg::Csv => ExportFormat::Csv,
        }
    }
}

/// Arguments for exporting a standardized loan
#[derive(Args)]
pub struct ExportArgs {
    /// Path to a standardized loan record (JSON)
    #[arg(long)]
    pub input: Option<String>,

    /// Interchange format
    #[arg(long, default_value = "json")]
    pub format: ExportFormatArg,

    /// Single-line JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,

    /// Decimal places for the rate column of XML/CSV summaries
    #[arg(long)]
    pub rate_decimal_places: Option<u32>,
}

/// Arguments for the standards compatibility report
#[derive(Args)]
pub struct InteropReportArgs {
    /// Path to a standardized loan record (JSON)
    #[arg(long)]
    pub input: Option<String>,
}

/// The exported document is returned as a JSON string so every `--output`
/// mode prints it verbatim.
pub fn run_export(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: StandardizedLoanData = input::load(args.input.as_deref(), "standardized loan record")?;

    let mut config = ExportConfig {
        pretty_json: !args.compact,
        ..Default::default()
    };
    if let Some(places) = args.rate_decimal_places {
        config.rate_decimal_places = places;
    }

    let format = ExportFormat::from(args.format);
    if args.compact && !matches!(format, ExportFormat::Json) {
        warn!(%format, "--compact only applies to JSON export");
    }

    let document = export_to_format(&record, format, &config)?;
    Ok(Value::String(document))
}

pub fn run_interop_report(args: InteropReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let record: StandardizedLoanData = input::load(args.input.as_deref(), "standardized loan record")?;
    let report = generate_interoperability_report(&record);
    Ok(serde_json::to_value(report)?)
}
