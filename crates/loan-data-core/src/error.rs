use thiserror::Error;

use crate::schema::lifecycle::LifecycleState;
use crate::schema::quality::ValidationIssue;

#[derive(Debug, Error)]
pub enum LoanDataError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Loan ID is required")]
    MissingIdentifier,

    #[error("Validation failed with {} error(s)", .0.len())]
    ValidationFailed(Vec<ValidationIssue>),

    #[error("Invalid lifecycle transition: {from} -> {to}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error("Loan is in terminal state {0}; no further transitions are allowed")]
    TerminalState(LifecycleState),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LoanDataError {
    fn from(e: serde_json::Error) -> Self {
        LoanDataError::SerializationError(e.to_string())
    }
}

/// Failures surfaced by the document intelligence adapter.
///
/// None of these are retried by the adapter. Callers that want a retry
/// policy can consult [`ExtractionError::is_retryable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Document intelligence provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Document intelligence provider rate limited the request")]
    ProviderRateLimited { retry_after_secs: Option<u64> },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Extraction mode '{mode}' requires the '{block}' block")]
    MissingModeBlock { mode: String, block: String },

    #[error("Inconsistent percentage/fraction notation across {group} rates")]
    InconsistentRateNotation { group: String },

    #[error("Unrecognised date in '{field}': {value}")]
    InvalidDate { field: String, value: String },

    #[error("Provider call timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },
}

impl ExtractionError {
    /// Transport-level failures a caller may choose to retry. Contract
    /// violations are deterministic and never retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExtractionError::ProviderUnavailable(_)
                | ExtractionError::ProviderRateLimited { .. }
                | ExtractionError::Timeout { .. }
        )
    }
}
