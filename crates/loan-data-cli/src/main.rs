mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::compare::CompareArgs;
use commands::extract::{ConfidenceArgs, ExtractArgs};
use commands::interop::{ExportArgs, InteropReportArgs};
use commands::lifecycle::{AmendArgs, TransitionArgs};
use commands::standardize::{StandardizeArgs, ValidateArgs};

/// Loan data standardization, comparison and interoperability export
#[derive(Parser)]
#[command(
    name = "lds",
    version,
    about = "Loan data standardization, comparison and interoperability export",
    long_about = "A CLI for turning raw or extracted loan terms into a canonical, \
                  validated loan record with decimal precision. Supports extraction \
                  from credit documents, validation, side-by-side comparison, \
                  JSON/XML/CSV export and standards compatibility reports."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize and validate a raw loan record into the canonical form
    Standardize(StandardizeArgs),
    /// Validate an already-standardized loan record
    Validate(ValidateArgs),
    /// Compare two or more standardized loans side by side
    Compare(CompareArgs),
    /// Export a standardized loan as JSON, XML or CSV
    Export(ExportArgs),
    /// Report compatibility with LMA, LSTA, APLMA, Basel III and other standards
    InteropReport(InteropReportArgs),
    /// Extract loan terms from a credit document via the document-intelligence provider
    Extract(ExtractArgs),
    /// Score a provider response without calling the provider
    Confidence(ConfidenceArgs),
    /// Move a loan to its next lifecycle state
    Transition(TransitionArgs),
    /// Append an amendment to a loan's amendment log
    Amend(AmendArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Standardize(args) => commands::standardize::run_standardize(args),
        Commands::Validate(args) => commands::standardize::run_validate(args),
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Export(args) => commands::interop::run_export(args),
        Commands::InteropReport(args) => commands::interop::run_interop_report(args),
        Commands::Extract(args) => commands::extract::run_extract(args),
        Commands::Confidence(args) => commands::extract::run_confidence(args),
        Commands::Transition(args) => commands::lifecycle::run_transition(args),
        Commands::Amend(args) => commands::lifecycle::run_amend(args),
        Commands::Version => {
            println!("lds {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
