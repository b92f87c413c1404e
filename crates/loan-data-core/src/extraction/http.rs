//! HTTP-backed document intelligence provider.
//!
//! Posts the document and extraction instruction to a configured endpoint
//! and returns the completion text. Uses a long-lived `reqwest::Client`
//! for connection pooling.

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use super::adapter::{DocumentIntelligenceProvider, DocumentPayload, ExtractionRequest};
use crate::error::{ExtractionError, LoanDataError};
use crate::LoanDataResult;

pub const ENV_PROVIDER_URL: &str = "LDS_PROVIDER_URL";
pub const ENV_PROVIDER_API_KEY: &str = "LDS_PROVIDER_API_KEY";
pub const ENV_PROVIDER_MODEL: &str = "LDS_PROVIDER_MODEL";
pub const ENV_PROVIDER_TIMEOUT_SECS: &str = "LDS_PROVIDER_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    /// Transport-level ceiling. Callers may impose a tighter bound via
    /// `DocumentIntelligenceAdapter::extract_with_timeout`.
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            model: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read `LDS_PROVIDER_*` variables. Only the URL is mandatory.
    pub fn from_env() -> LoanDataResult<Self> {
        Self::from_env_with_endpoint(None)
    }

    /// As [`from_env`](Self::from_env), with `endpoint` taking the place of
    /// `LDS_PROVIDER_URL` when given. The other variables are still validated.
    pub fn from_env_with_endpoint(endpoint: Option<String>) -> LoanDataResult<Self> {
        let endpoint = match endpoint {
            Some(url) => url,
            None => std::env::var(ENV_PROVIDER_URL).map_err(|_| LoanDataError::InvalidInput {
                field: ENV_PROVIDER_URL.into(),
                reason: "document intelligence endpoint is not configured".into(),
            })?,
        };
        let timeout = match std::env::var(ENV_PROVIDER_TIMEOUT_SECS) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| LoanDataError::InvalidInput {
                    field: ENV_PROVIDER_TIMEOUT_SECS.into(),
                    reason: format!("expected whole seconds, got '{raw}'"),
                })?,
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        Ok(Self {
            endpoint,
            api_key: std::env::var(ENV_PROVIDER_API_KEY).ok().filter(|k| !k.is_empty()),
            model: std::env::var(ENV_PROVIDER_MODEL).ok().filter(|m| !m.is_empty()),
            timeout,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderRequestBody<'a> {
    document_type: &'a str,
    extraction_mode: &'a str,
    instruction: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    document: DocumentBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum DocumentBody<'a> {
    Base64 {
        data: String,
        #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
        mime_type: Option<&'a str>,
    },
    Uri(&'a str),
    Text(&'a str),
}

#[derive(Debug, Deserialize)]
struct ProviderResponseBody {
    /// Completion text, expected to hold the extraction JSON.
    output: String,
}

pub struct HttpDocumentProvider {
    client: Client,
    config: ProviderConfig,
}

impl HttpDocumentProvider {
    pub fn new(config: ProviderConfig) -> LoanDataResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| LoanDataError::InvalidInput {
                field: "provider".into(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

#[async_trait]
impl DocumentIntelligenceProvider for HttpDocumentProvider {
    async fn complete(&self, request: &ExtractionRequest) -> Result<String, ExtractionError> {
        let document = match &request.document {
            DocumentPayload::Bytes { data, mime_type } => DocumentBody::Base64 {
                data: base64::engine::general_purpose::STANDARD.encode(data),
                mime_type: mime_type.as_deref(),
            },
            DocumentPayload::Uri(uri) => DocumentBody::Uri(uri),
            DocumentPayload::Text(text) => DocumentBody::Text(text),
        };
        let body = ProviderRequestBody {
            document_type: &request.document_type,
            extraction_mode: request.mode.as_str(),
            instruction: &request.instruction,
            model: self.config.model.as_deref(),
            document,
        };

        let mut builder = self.client.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        debug!(endpoint = %self.config.endpoint, "Posting extraction request");
        let response = builder.send().await.map_err(|e| {
            error!("Provider request failed: {}", e);
            if e.is_timeout() {
                ExtractionError::Timeout {
                    after_ms: self.config.timeout.as_millis() as u64,
                }
            } else {
                ExtractionError::ProviderUnavailable(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            return Err(ExtractionError::ProviderRateLimited { retry_after_secs });
        }
        if status.is_server_error() {
            let text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::ProviderUnavailable(format!("{status}: {text}")));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::MalformedResponse(format!(
                "provider rejected request ({status}): {text}"
            )));
        }

        let parsed: ProviderResponseBody = response.json().await.map_err(|e| {
            ExtractionError::MalformedResponse(format!("unexpected provider envelope: {e}"))
        })?;
        Ok(parsed.output)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::contract::ExtractionMode;

    #[test]
    fn test_request_body_shape() {
        let body = ProviderRequestBody {
            document_type: "term_sheet",
            extraction_mode: ExtractionMode::Regulatory.as_str(),
            instruction: "extract",
            model: None,
            document: DocumentBody::Base64 {
                data: base64::engine::general_purpose::STANDARD.encode(b"%PDF"),
                mime_type: Some("application/pdf"),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["extractionMode"], "regulatory");
        assert_eq!(json["document"]["base64"]["data"], "JVBERg==");
        assert_eq!(json["document"]["base64"]["mimeType"], "application/pdf");
        assert!(json["document"]["base64"].get("mime_type").is_none());
        assert!(json.get("model").is_none());
    }

    #[test]
    fn test_config_defaults() {
        let cfg = ProviderConfig::new("http://localhost:8080/extract");
        assert_eq!(cfg.timeout, Duration::from_secs(120));
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn test_endpoint_override_still_checks_timeout() {
        std::env::set_var(ENV_PROVIDER_TIMEOUT_SECS, "soon");
        let result = ProviderConfig::from_env_with_endpoint(Some("http://localhost:9/extract".into()));
        std::env::remove_var(ENV_PROVIDER_TIMEOUT_SECS);

        let err = result.unwrap_err();
        assert!(matches!(err, LoanDataError::InvalidInput { ref field, .. } if field == ENV_PROVIDER_TIMEOUT_SECS));

        let cfg = ProviderConfig::from_env_with_endpoint(Some("http://localhost:9/extract".into())).unwrap();
        assert_eq!(cfg.endpoint, "http://localhost:9/extract");
    }
}
