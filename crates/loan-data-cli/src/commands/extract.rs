use std::time::Duration;

use clap::Args;
use serde_json::{json, Value};
use tracing::info;

use loan_data_core::config::ConfidenceWeights;
use loan_data_core::extraction::{
    explain_confidence, parse_provider_response, DocumentIntelligenceAdapter, DocumentPayload,
    ExtractionMode, HttpDocumentProvider, ProviderConfig,
};
use loan_data_core::{standardize, PartialLoanRecord};

use crate::input;

/// Arguments for document extraction
#[derive(Args)]
pub struct ExtractArgs {
    /// Path to the credit document (PDF, image, DOCX or text)
    #[arg(long, conflicts_with = "uri")]
    pub document: Option<String>,

    /// Remote location of the document, passed through to the provider
    #[arg(long)]
    pub uri: Option<String>,

    /// Kind of document, e.g. facility_agreement, term_sheet
    #[arg(long, default_value = "facility_agreement")]
    pub document_type: String,

    /// regulatory, institutional or comprehensive
    #[arg(long, default_value = "institutional")]
    pub mode: ExtractionMode,

    /// Overall deadline for the extraction, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Provider endpoint (defaults to LDS_PROVIDER_URL)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Standardize the extracted terms under this loan ID
    #[arg(long)]
    pub loan_id: Option<String>,
}

/// Arguments for offline confidence scoring
#[derive(Args)]
pub struct ConfidenceArgs {
    /// Path to a saved provider response (stdin if omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Mode the response was requested in
    #[arg(long, default_value = "institutional")]
    pub mode: ExtractionMode,
}

pub fn run_extract(args: ExtractArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let document = match (&args.document, &args.uri) {
        (Some(path), _) => DocumentPayload::Bytes {
            data: input::file::read_bytes(path)?,
            mime_type: input::file::mime_type(path),
        },
        (None, Some(uri)) => DocumentPayload::Uri(uri.clone()),
        (None, None) => match input::stdin::read_stdin_text()? {
            Some(text) => DocumentPayload::Text(text),
            None => return Err("document required: pass --document, --uri or pipe text on stdin".into()),
        },
    };

    let provider = HttpDocumentProvider::new(ProviderConfig::from_env_with_endpoint(args.endpoint)?)?;
    let adapter = DocumentIntelligenceAdapter::new(provider);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(async {
        match args.timeout_secs {
            Some(secs) => {
                adapter
                    .extract_with_timeout(document, &args.document_type, args.mode, Duration::from_secs(secs))
                    .await
            }
            None => adapter.extract(document, &args.document_type, args.mode).await,
        }
    })?;

    info!(confidence = outcome.confidence, "extraction complete");

    let standardization = match args.loan_id {
        Some(id) => {
            let raw = PartialLoanRecord::from_extraction(Some(id), &outcome.terms);
            Some(standardize(&raw))
        }
        None => None,
    };

    Ok(json!({
        "extraction": outcome,
        "standardization": standardization,
    }))
}

pub fn run_confidence(args: ConfidenceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let response = match args.input {
        Some(ref path) => input::file::read_text(path)?,
        None => input::stdin::read_stdin_text()?
            .ok_or("provider response required: pass --input <file> or pipe it on stdin")?,
    };

    let terms = parse_provider_response(&response, args.mode)?;
    let breakdown = explain_confidence(&terms, &ConfidenceWeights::default());

    Ok(json!({
        "confidence": breakdown.score,
        "mode": args.mode,
        "present": breakdown.present,
        "missing": breakdown.missing,
        "terms": terms,
    }))
}
