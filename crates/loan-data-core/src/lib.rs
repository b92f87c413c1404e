pub mod config;
pub mod error;
pub mod schema;
pub mod standardizer;
pub mod types;

#[cfg(feature = "extraction")]
pub mod extraction;

#[cfg(feature = "comparison")]
pub mod comparison;

#[cfg(feature = "interop")]
pub mod interop;

pub use error::{ExtractionError, LoanDataError};
pub use schema::StandardizedLoanData;
pub use standardizer::{
    standardize, standardize_with, validate_loan_data, PartialLoanRecord, StandardizationOutcome,
    ValidationReport,
};
pub use types::*;

/// Standard result type for all loan-data operations
pub type LoanDataResult<T> = Result<T, LoanDataError>;
