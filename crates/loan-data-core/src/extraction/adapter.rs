//! Document intelligence adapter
//!
//! Sends a document to an external OCR + completion provider and enforces
//! the extraction contract on what comes back. One outbound call per
//! extraction; no retries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use super::confidence::score_confidence;
use super::contract::{extraction_instruction, parse_provider_response, ExtractedLoanTerms, ExtractionMode};
use crate::config::ConfidenceWeights;
use crate::error::ExtractionError;

/// Document handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentPayload {
    Bytes {
        data: Vec<u8>,
        mime_type: Option<String>,
    },
    Uri(String),
    /// Text already pulled out of the document upstream.
    Text(String),
}

#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub document: DocumentPayload,
    pub document_type: String,
    pub mode: ExtractionMode,
    /// System instruction describing the JSON the provider must return.
    pub instruction: String,
}

/// Narrow request/response seam to the OCR + completion service.
///
/// Implementations return the provider's raw completion text and map
/// transport failures to `ProviderUnavailable` / `ProviderRateLimited`.
#[async_trait]
pub trait DocumentIntelligenceProvider: Send + Sync {
    async fn complete(&self, request: &ExtractionRequest) -> Result<String, ExtractionError>;

    fn name(&self) -> &str {
        "document-intelligence"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOutcome {
    pub terms: ExtractedLoanTerms,
    /// 0–99; automated scores never reach 100.
    pub confidence: u8,
    pub mode: ExtractionMode,
    pub document_type: String,
    pub provider: String,
}

pub struct DocumentIntelligenceAdapter<P> {
    provider: P,
    weights: ConfidenceWeights,
}

impl<P: DocumentIntelligenceProvider> DocumentIntelligenceAdapter<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            weights: ConfidenceWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: ConfidenceWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run one extraction. Dropping the returned future cancels the call.
    pub async fn extract(
        &self,
        document: DocumentPayload,
        document_type: &str,
        mode: ExtractionMode,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        let request = ExtractionRequest {
            document,
            document_type: document_type.to_string(),
            mode,
            instruction: extraction_instruction(mode, document_type),
        };

        info!(
            provider = self.provider.name(),
            %mode,
            document_type,
            "Requesting document extraction"
        );
        let start = Instant::now();

        let text = self.provider.complete(&request).await.map_err(|e| {
            match &e {
                ExtractionError::ProviderRateLimited { retry_after_secs } => {
                    warn!(provider = self.provider.name(), ?retry_after_secs, "Provider rate limited")
                }
                _ => error!(provider = self.provider.name(), error = %e, "Provider call failed"),
            }
            e
        })?;

        let terms = parse_provider_response(&text, mode).map_err(|e| {
            warn!(%mode, error = %e, "Provider response violates extraction contract");
            e
        })?;
        let confidence = score_confidence(&terms, &self.weights);

        info!(
            provider = self.provider.name(),
            %mode,
            confidence,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Extraction complete"
        );

        Ok(ExtractionOutcome {
            terms,
            confidence,
            mode,
            document_type: document_type.to_string(),
            provider: self.provider.name().to_string(),
        })
    }

    /// `extract` bounded by `timeout`. Elapsed calls surface as `Timeout`.
    pub async fn extract_with_timeout(
        &self,
        document: DocumentPayload,
        document_type: &str,
        mode: ExtractionMode,
        timeout: Duration,
    ) -> Result<ExtractionOutcome, ExtractionError> {
        match tokio::time::timeout(timeout, self.extract(document, document_type, mode)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Extraction timed out");
                Err(ExtractionError::Timeout {
                    after_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

/// Provider that replays canned responses. Used in tests and offline demos.
pub struct StaticProvider {
    response: Result<String, ExtractionError>,
    delay: Option<Duration>,
}

impl StaticProvider {
    pub fn responding(body: impl Into<String>) -> Self {
        Self {
            response: Ok(body.into()),
            delay: None,
        }
    }

    pub fn failing(error: ExtractionError) -> Self {
        Self {
            response: Err(error),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl DocumentIntelligenceProvider for StaticProvider {
    async fn complete(&self, _request: &ExtractionRequest) -> Result<String, ExtractionError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"loanAmount": 1000000, "currency": "EUR", "interestRate": 0.05,
        "borrower": "Acme", "lender": "Bank", "termMonths": 24}"#;

    fn text_doc() -> DocumentPayload {
        DocumentPayload::Text("Facility Agreement ...".into())
    }

    #[tokio::test]
    async fn test_extract_scores_confidence() {
        let adapter = DocumentIntelligenceAdapter::new(StaticProvider::responding(BODY));
        let outcome = adapter
            .extract(text_doc(), "credit_agreement", ExtractionMode::Institutional)
            .await
            .unwrap();
        // 20 + 20 + 15 + 15 + 10
        assert_eq!(outcome.confidence, 80);
        assert_eq!(outcome.provider, "static");
        assert_eq!(outcome.document_type, "credit_agreement");
    }

    #[tokio::test]
    async fn test_rate_limit_surfaces_unchanged() {
        let adapter = DocumentIntelligenceAdapter::new(StaticProvider::failing(
            ExtractionError::ProviderRateLimited {
                retry_after_secs: Some(30),
            },
        ));
        let err = adapter
            .extract(text_doc(), "term_sheet", ExtractionMode::Institutional)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ExtractionError::ProviderRateLimited {
                retry_after_secs: Some(30)
            }
        );
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_mode_block_enforced() {
        let adapter = DocumentIntelligenceAdapter::new(StaticProvider::responding(BODY));
        let err = adapter
            .extract(text_doc(), "term_sheet", ExtractionMode::Regulatory)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::MissingModeBlock { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_timeout_bounds_slow_provider() {
        let provider = StaticProvider::responding(BODY).with_delay(Duration::from_millis(200));
        let adapter = DocumentIntelligenceAdapter::new(provider);
        let err = adapter
            .extract_with_timeout(
                text_doc(),
                "term_sheet",
                ExtractionMode::Institutional,
                Duration::from_millis(10),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ExtractionError::Timeout { after_ms: 10 });
    }
}
