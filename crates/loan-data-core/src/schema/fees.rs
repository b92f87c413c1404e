use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, Money, Rate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeType {
    Arrangement,
    Commitment,
    Agency,
    Upfront,
    Utilisation,
    Participation,
    Prepayment,
    Other,
}

impl FeeType {
    pub fn parse_loose(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.contains("arrang") || lower.contains("structuring") {
            FeeType::Arrangement
        } else if lower.contains("commitment") || lower.contains("undrawn") {
            FeeType::Commitment
        } else if lower.contains("agen") {
            FeeType::Agency
        } else if lower.contains("upfront") || lower.contains("front-end") {
            FeeType::Upfront
        } else if lower.contains("utilis") || lower.contains("utiliz") {
            FeeType::Utilisation
        } else if lower.contains("participation") {
            FeeType::Participation
        } else if lower.contains("prepay") || lower.contains("break") {
            FeeType::Prepayment
        } else {
            FeeType::Other
        }
    }

    /// Default structure when the source does not state one.
    pub fn default_structure(&self) -> FeeStructure {
        match self {
            FeeType::Arrangement | FeeType::Upfront | FeeType::Participation => {
                FeeStructure::Upfront
            }
            FeeType::Commitment | FeeType::Agency | FeeType::Utilisation => FeeStructure::Ongoing,
            FeeType::Prepayment | FeeType::Other => FeeStructure::Conditional,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeStructure {
    Upfront,
    Ongoing,
    Conditional,
}

/// A fee is charged either as an absolute amount or as a rate on a base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeeCharge {
    Amount(Money),
    /// Decimal fraction of the facility amount (0.01 = 1%).
    Percentage(Rate),
}

impl FeeCharge {
    pub fn amount(&self) -> Option<Money> {
        match self {
            FeeCharge::Amount(a) => Some(*a),
            FeeCharge::Percentage(_) => None,
        }
    }

    pub fn percentage(&self) -> Option<Rate> {
        match self {
            FeeCharge::Percentage(p) => Some(*p),
            FeeCharge::Amount(_) => None,
        }
    }

    /// Absolute amount, resolving percentages against `base` when supplied.
    pub fn resolve(&self, base: Option<Money>) -> Option<Money> {
        match self {
            FeeCharge::Amount(a) => Some(*a),
            FeeCharge::Percentage(p) => base.map(|b| b * *p),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    #[serde(rename = "type")]
    pub fee_type: FeeType,
    pub structure: FeeStructure,
    pub charge: FeeCharge,
    pub currency: CurrencyCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_timing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Sum of absolute fee amounts. Percentage fees are resolved against
/// `base` when given, otherwise they contribute zero.
pub fn total_fee_amount(fees: &[Fee], base: Option<Money>) -> Money {
    fees.iter()
        .map(|f| f.charge.resolve(base).unwrap_or(Decimal::ZERO))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fee(charge: FeeCharge) -> Fee {
        Fee {
            fee_type: FeeType::Arrangement,
            structure: FeeStructure::Upfront,
            charge,
            currency: "USD".into(),
            payment_timing: None,
            description: None,
        }
    }

    #[test]
    fn test_total_fee_amount_mixed() {
        let fees = vec![
            fee(FeeCharge::Amount(dec!(25_000))),
            fee(FeeCharge::Percentage(dec!(0.01))),
        ];
        assert_eq!(total_fee_amount(&fees, Some(dec!(1_000_000))), dec!(35_000));
        assert_eq!(total_fee_amount(&fees, None), dec!(25_000));
    }

    #[test]
    fn test_charge_wire_shape() {
        let json = serde_json::to_value(FeeCharge::Percentage(dec!(0.0125))).unwrap();
        assert_eq!(json, serde_json::json!({"percentage": "0.0125"}));
    }

    #[test]
    fn test_fee_type_defaults() {
        assert_eq!(FeeType::parse_loose("Commitment fee on undrawn"), FeeType::Commitment);
        assert_eq!(FeeType::Commitment.default_structure(), FeeStructure::Ongoing);
        assert_eq!(FeeType::Arrangement.default_structure(), FeeStructure::Upfront);
    }
}
