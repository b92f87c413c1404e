use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;

use loan_data_core::config::{ConfidenceWeights, ExportConfig, ValidationConfig};
use loan_data_core::schema::{Amendment, ExportFormat, LifecycleState};
use loan_data_core::{PartialLoanRecord, StandardizedLoanData};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_record(record_json: &str) -> NapiResult<StandardizedLoanData> {
    loan_data_core::interop::import_json(record_json).map_err(to_napi_error)
}

fn parse_config<T: serde::de::DeserializeOwned + Default>(config_json: Option<String>) -> NapiResult<T> {
    match config_json {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw).map_err(to_napi_error),
        _ => Ok(T::default()),
    }
}

// ---------------------------------------------------------------------------
// Standardization
// ---------------------------------------------------------------------------

/// Returns the full outcome; a rejected record is not a thrown error.
#[napi]
pub fn standardize(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let raw: PartialLoanRecord = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config: ValidationConfig = parse_config(config_json)?;
    let outcome = loan_data_core::standardize_with(&raw, &config, chrono::Utc::now());
    serde_json::to_string(&outcome).map_err(to_napi_error)
}

#[napi]
pub fn validate_loan_data(record_json: String, config_json: Option<String>) -> NapiResult<String> {
    let record = parse_record(&record_json)?;
    let config: ValidationConfig = parse_config(config_json)?;
    let report = loan_data_core::validate_loan_data(&record, &config);
    serde_json::to_string(&report).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_loan_terms(loans_json: String) -> NapiResult<String> {
    let loans: Vec<StandardizedLoanData> =
        serde_json::from_str(&loans_json).map_err(to_napi_error)?;
    let output = loan_data_core::comparison::compare_loan_terms(&loans).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Interoperability
// ---------------------------------------------------------------------------

#[napi]
pub fn export_to_format(
    record_json: String,
    format: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let record = parse_record(&record_json)?;
    let format: ExportFormat = format.parse().map_err(to_napi_error)?;
    let config: ExportConfig = parse_config(config_json)?;
    loan_data_core::interop::export_to_format(&record, format, &config).map_err(to_napi_error)
}

#[napi]
pub fn generate_interoperability_report(record_json: String) -> NapiResult<String> {
    let record = parse_record(&record_json)?;
    let report = loan_data_core::interop::generate_interoperability_report(&record);
    serde_json::to_string(&report).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Parse a provider response and score it. The provider call itself stays
/// on the host side.
#[napi]
pub fn score_confidence(response_text: String, mode: String) -> NapiResult<String> {
    let mode: loan_data_core::extraction::ExtractionMode = mode.parse().map_err(to_napi_error)?;
    let terms = loan_data_core::extraction::parse_provider_response(&response_text, mode)
        .map_err(to_napi_error)?;
    let breakdown =
        loan_data_core::extraction::explain_confidence(&terms, &ConfidenceWeights::default());
    let output = serde_json::json!({
        "confidence": breakdown,
        "terms": terms,
    });
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[napi]
pub fn transition_lifecycle(
    record_json: String,
    to: String,
    date: String,
    description: Option<String>,
) -> NapiResult<String> {
    let mut record = parse_record(&record_json)?;
    let to: LifecycleState =
        serde_json::from_value(serde_json::Value::String(to)).map_err(to_napi_error)?;
    let date: NaiveDate = date.parse().map_err(to_napi_error)?;
    record.transition(to, date, description).map_err(to_napi_error)?;
    serde_json::to_string(&record).map_err(to_napi_error)
}

#[napi]
pub fn amend_loan(record_json: String, amendment_json: String) -> NapiResult<String> {
    let mut record = parse_record(&record_json)?;
    let amendment: Amendment = serde_json::from_str(&amendment_json).map_err(to_napi_error)?;
    record.amend(amendment).map_err(to_napi_error)?;
    serde_json::to_string(&record).map_err(to_napi_error)
}
