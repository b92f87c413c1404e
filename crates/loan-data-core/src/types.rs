use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Basis points (100 bps = 1%). Signed.
pub type Bps = Decimal;

/// ISO-4217 alphabetic currency code, e.g. "USD".
pub type CurrencyCode = String;

/// Basis points per unit of rate.
pub const BPS_PER_UNIT: Decimal = dec!(10000);

/// A monetary value tagged with its currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonetaryAmount {
    pub value: Money,
    pub currency: CurrencyCode,
}

impl MonetaryAmount {
    pub fn new(value: Money, currency: impl Into<CurrencyCode>) -> Self {
        Self {
            value,
            currency: currency.into(),
        }
    }
}

/// Convert basis points to a decimal rate (50 bps -> 0.005).
pub fn bps_to_rate(bps: Bps) -> Rate {
    bps / BPS_PER_UNIT
}

/// Convert a decimal rate to basis points (0.005 -> 50 bps).
pub fn rate_to_bps(rate: Rate) -> Bps {
    rate * BPS_PER_UNIT
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
