//! Serialization of canonical records to interchange formats.
//!
//! JSON carries the full record and round-trips through [`import_json`].
//! XML and CSV are summaries of six fields (id, borrower, amount, currency,
//! rate, maturity) and cannot be imported back.

use quick_xml::escape::escape;
use std::fmt::Write as _;
use tracing::{debug, warn};

use crate::config::ExportConfig;
use crate::error::LoanDataError;
use crate::schema::{ExportFormat, StandardizedLoanData};
use crate::LoanDataResult;

pub const CSV_HEADER: [&str; 6] = ["ID", "Borrower", "Amount", "Currency", "Rate", "Maturity"];
pub const XML_ROOT: &str = "loan";

pub fn export_to_format(
    record: &StandardizedLoanData,
    format: ExportFormat,
    config: &ExportConfig,
) -> LoanDataResult<String> {
    if !format.is_lossless() {
        warn!(loan_id = %record.id, %format, "summary export drops all but six fields");
    }
    let out = match format {
        ExportFormat::Json => to_json(record, config)?,
        ExportFormat::Xml => to_xml(record, config)?,
        ExportFormat::Csv => to_csv(record, config)?,
    };
    debug!(loan_id = %record.id, %format, bytes = out.len(), "record exported");
    Ok(out)
}

/// Parse a JSON export back into a canonical record.
pub fn import_json(json: &str) -> LoanDataResult<StandardizedLoanData> {
    Ok(serde_json::from_str(json)?)
}

fn to_json(record: &StandardizedLoanData, config: &ExportConfig) -> LoanDataResult<String> {
    let json = if config.pretty_json {
        serde_json::to_string_pretty(record)?
    } else {
        serde_json::to_string(record)?
    };
    Ok(json)
}

/// Summary columns shared by the XML and CSV exports.
struct Summary {
    id: String,
    borrower: String,
    amount: String,
    currency: String,
    rate: String,
    maturity: String,
}

impl Summary {
    fn of(record: &StandardizedLoanData, config: &ExportConfig) -> Self {
        let terms = &record.financial_terms;
        Self {
            id: record.id.clone(),
            borrower: record.parties.borrower.name.clone(),
            amount: terms.amount.value.to_string(),
            currency: terms.amount.currency.clone(),
            rate: terms
                .pricing
                .effective_all_in_rate()
                .map(|r| r.round_dp(config.rate_decimal_places).normalize().to_string())
                .unwrap_or_default(),
            maturity: terms
                .term
                .maturity_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

fn to_xml(record: &StandardizedLoanData, config: &ExportConfig) -> LoanDataResult<String> {
    let s = Summary::of(record, config);
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let fields = [
        ("borrower", &s.borrower),
        ("amount", &s.amount),
        ("currency", &s.currency),
        ("rate", &s.rate),
        ("maturity", &s.maturity),
    ];

    write_xml(&mut xml, &s.id, &fields).map_err(|e| LoanDataError::Export(e.to_string()))?;
    Ok(xml)
}

fn write_xml(xml: &mut String, id: &str, fields: &[(&str, &String)]) -> std::fmt::Result {
    writeln!(xml, "<{XML_ROOT} id=\"{}\">", escape(id))?;
    for (tag, value) in fields {
        if value.is_empty() {
            writeln!(xml, "  <{tag}/>")?;
        } else {
            writeln!(xml, "  <{tag}>{}</{tag}>", escape(value.as_str()))?;
        }
    }
    writeln!(xml, "</{XML_ROOT}>")
}

fn to_csv(record: &StandardizedLoanData, config: &ExportConfig) -> LoanDataResult<String> {
    let s = Summary::of(record, config);
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)
        .map_err(|e| LoanDataError::Export(e.to_string()))?;
    wtr.write_record([&s.id, &s.borrower, &s.amount, &s.currency, &s.rate, &s.maturity])
        .map_err(|e| LoanDataError::Export(e.to_string()))?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| LoanDataError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| LoanDataError::Export(e.to_string()))
}
