use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Rate;

/// Upper bound of the Basel standardised risk-weight scale, in percent.
pub const BASEL_MAX_RISK_WEIGHT: Decimal = dec!(1250);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulatoryInfo {
    /// ISO-3166-1 alpha-2 country code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governing_law: Option<String>,
    #[serde(default)]
    pub applicable_regulations: Vec<String>,
    /// Basel risk weight in percent, 0–1250.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basel_risk_weight: Option<Decimal>,
    /// Capital held against the exposure, as a decimal fraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_requirement: Option<Rate>,
    #[serde(default)]
    pub reporting_requirements: Vec<String>,
}

/// Two upper-case ASCII letters. Shape only; not checked against the ISO list.
pub fn is_alpha2_country(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase())
}

pub fn is_valid_risk_weight(weight: Decimal) -> bool {
    weight >= Decimal::ZERO && weight <= BASEL_MAX_RISK_WEIGHT
}
