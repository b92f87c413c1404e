//! Document intelligence: extraction contract, provider adapter and
//! confidence scoring.

pub mod adapter;
pub mod confidence;
pub mod contract;
#[cfg(feature = "http")]
pub mod http;
pub mod normalize;

pub use adapter::{
    DocumentIntelligenceAdapter, DocumentIntelligenceProvider, DocumentPayload, ExtractionOutcome,
    ExtractionRequest, StaticProvider,
};
pub use confidence::{explain_confidence, score_confidence, ConfidenceBreakdown, MAX_AUTOMATED_CONFIDENCE};
pub use contract::{extraction_instruction, parse_provider_response, ExtractedLoanTerms, ExtractionMode};
#[cfg(feature = "http")]
pub use http::{HttpDocumentProvider, ProviderConfig};
