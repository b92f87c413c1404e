//! Canonical loan interchange schema.
//!
//! `StandardizedLoanData` is the root aggregate; every other type in this
//! module is owned by it. Monetary values, rates and basis points are
//! `rust_decimal::Decimal`; wire names are camelCase.

pub mod covenants;
pub mod documentation;
pub mod esg;
pub mod facility;
pub mod fees;
pub mod financial;
pub mod interoperability;
pub mod lifecycle;
pub mod loan;
pub mod parties;
pub mod quality;
pub mod regulatory;
pub mod security;

pub use covenants::*;
pub use documentation::*;
pub use esg::*;
pub use facility::*;
pub use fees::*;
pub use financial::*;
pub use interoperability::*;
pub use lifecycle::*;
pub use loan::StandardizedLoanData;
pub use parties::*;
pub use quality::*;
pub use regulatory::*;
pub use security::*;
